//! Interactive profile selection.

use anstyle::AnsiColor;
use inquire::{InquireError, Select};
use std::fmt;

use crate::profiles::Profile;
use crate::ui::Ui;

/// Number of profiles visible at once
const PAGE_SIZE: usize = 20;

/// Chooses one profile out of a list
pub trait Picker {
    /// Returns `None` when the user cancels or the prompt cannot be shown.
    fn pick<'a>(&self, profiles: &'a [Profile]) -> Option<&'a Profile>;
}

/// Searchable terminal list built on inquire
#[derive(Debug, Clone)]
pub struct InquirePicker<'u> {
    ui: &'u Ui,
}

impl<'u> InquirePicker<'u> {
    pub fn new(ui: &'u Ui) -> Self {
        Self { ui }
    }
}

/// One row in the select list
struct Choice<'a>(&'a Profile);

impl fmt::Display for Choice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Picker for InquirePicker<'_> {
    fn pick<'a>(&self, profiles: &'a [Profile]) -> Option<&'a Profile> {
        let choices: Vec<Choice<'a>> = profiles.iter().map(Choice).collect();

        let result = Select::new("Profiles:", choices)
            .with_page_size(PAGE_SIZE)
            .with_formatter(&|choice| choice.value.0.title.clone())
            .with_help_message("Type to filter, Enter to connect, Esc to quit")
            .prompt();

        match result {
            Ok(Choice(profile)) => {
                print_details(self.ui, profile);
                Some(profile)
            }
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                tracing::debug!("profile selection cancelled");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile selection failed");
                None
            }
        }
    }
}

/// Print the connection details of the chosen profile
pub fn print_details(ui: &Ui, profile: &Profile) {
    ui.println(ui.colored(&profile.title, AnsiColor::Yellow));
    ui.println(details_table(ui, profile));
}

fn details_table(ui: &Ui, profile: &Profile) -> String {
    let mut table = ui.simple_table();
    let none = || ui.dim("-");

    let rows = [
        ("Name:", profile.name.clone()),
        ("User:", profile.user.clone().unwrap_or_else(none)),
        ("Host:", profile.host.clone().unwrap_or_else(none)),
        ("Key:", profile.key.clone().unwrap_or_else(none)),
        ("Port:", profile.port.to_string()),
        ("Description:", profile.description.clone().unwrap_or_else(none)),
    ];
    for (label, value) in rows {
        table.add_row(vec![ui.label_cell(label), ui.cell(value)]);
    }

    table.to_string()
}
