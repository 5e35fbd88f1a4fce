mod app;
mod components;
mod config;
mod dom;
mod error;
mod theme;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = app::run() {
        // The logger may not be up yet if startup failed early.
        web_sys::console::error_1(&format!("Page controller failed to start: {}", e).into());
    }
}
