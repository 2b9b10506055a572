use std::process;

fn main() {
    match host_bootstrap_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("host-bootstrap error: {err}");
            process::exit(1);
        }
    }
}
