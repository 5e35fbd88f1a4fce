pub mod back_to_top;
pub mod contact_form;
pub mod nav_toggle;
pub mod skill_bars;
