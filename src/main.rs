//! vms binary entry point.

use vms::engine::EngineError;
use vms::repo::StoreError;
use vms::ui::output;

fn main() {
    if let Err(err) = vms::cli::run() {
        output::error(format_args!("{:#}", err));
        if is_integrity_violation(&err) {
            eprintln!("{}", output::integrity_banner(format_args!("{:#}", err)));
        }
        std::process::exit(1);
    }
}

fn is_integrity_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<EngineError>()
            .is_some_and(EngineError::is_integrity_violation)
            || cause
                .downcast_ref::<StoreError>()
                .is_some_and(StoreError::is_integrity_violation)
    })
}
