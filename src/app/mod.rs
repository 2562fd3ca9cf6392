//! Application orchestration module

pub mod initialization;
pub mod execution;
pub mod script;

pub use initialization::{
    load_configuration,
    configure_logging,
    create_renderer,
    handle_export_config
};
pub use execution::{
    load_script,
    run_scenario,
    run_script,
    RunSummary
};
pub use script::{Script, Step};
