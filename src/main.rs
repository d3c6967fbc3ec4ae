use std::ffi::OsString;
use std::process::ExitCode;

use qssh::{
    commands,
    logging::init_logging,
    paths::Paths,
    picker::InquirePicker,
    profiles::{Profile, load_profiles},
    settings::{ExitPolicy, Settings},
    ssh::SystemSsh,
    ui::Ui,
};

fn main() -> ExitCode {
    init_logging();

    let (settings, warnings) = Settings::from_env();
    let ui = Ui::new(settings.color);
    for e in warnings {
        ui.warn(format!("{:#}; using the default", e));
    }

    let profiles: Vec<Profile> = match Paths::new() {
        Ok(paths) => load_profiles(&paths.ssh_config, &ui),
        Err(e) => {
            ui.warn(format!("{:#}; continuing without profiles", e));
            Vec::new()
        }
    };

    // Raw argv: everything except `-h` and a bare profile name belongs to ssh
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let ssh = SystemSsh::new(&settings.ssh_program);
    let picker = InquirePicker::new(&ui);

    let child_code = match commands::dispatch(&args, profiles, &ssh, &picker, &ui) {
        Ok(outcome) => outcome.child_code(),
        Err(e) => {
            tracing::warn!("ssh invocation failed: {:#}", e);
            if settings.exit_policy == ExitPolicy::Propagate {
                ui.err(format!("{:#}", e));
            }
            None
        }
    };

    ExitCode::from(settings.exit_policy.exit_code(child_code))
}
