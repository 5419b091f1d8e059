use task_board::app::App;

fn main() {
    task_board::init_logging();
    leptos::mount::mount_to_body(App);
}
