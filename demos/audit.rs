use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    stats_audit::example_apps::run_audit_cli(std::env::args().skip(1))
}
