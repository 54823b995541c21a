//! Household CLI commands
//!
//! Households and the envelopes (sections and categories) inside them.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::EnvelopeResult;
use crate::services::HouseholdService;
use crate::storage::Storage;

use super::resolve_household;

/// Household subcommands
#[derive(Subcommand)]
pub enum HouseholdCommands {
    /// Create a new household
    Create {
        /// Household name
        name: String,
    },

    /// List households
    List,

    /// Add a section (a group of categories, itself assignable)
    AddSection {
        /// Section name
        name: String,
    },

    /// Add a category to a section
    AddCategory {
        /// Section name or ID
        section: String,
        /// Category name
        name: String,
    },

    /// List sections and their categories
    Envelopes,
}

/// Handle a household command
pub fn handle_household_command(
    storage: &Storage,
    settings: &Settings,
    household: Option<&str>,
    cmd: HouseholdCommands,
) -> EnvelopeResult<()> {
    let service = HouseholdService::new(storage).with_actor(settings.actor.clone());

    match cmd {
        HouseholdCommands::Create { name } => {
            let created = service.create_household(&name)?;
            println!("Created household: {}", created.name);
            println!("  ID: {}", created.id);
        }

        HouseholdCommands::List => {
            let households = service.list_households()?;
            if households.is_empty() {
                println!("No households found.");
                return Ok(());
            }
            for h in households {
                println!("{:30} {}", h.name, h.id);
            }
        }

        HouseholdCommands::AddSection { name } => {
            let household = resolve_household(storage, household)?;
            let section = service.add_section(household.id, &name)?;
            println!("Added section '{}' to {}", section.name, household.name);
        }

        HouseholdCommands::AddCategory { section, name } => {
            let household = resolve_household(storage, household)?;
            let section = service.find_section(household.id, &section)?;
            let category = service.add_category(household.id, section.id, &name)?;
            println!("Added category '{}' to section '{}'", category.name, section.name);
        }

        HouseholdCommands::Envelopes => {
            let household = resolve_household(storage, household)?;
            let sections = service.list_sections(household.id)?;
            let categories = service.list_categories(household.id)?;

            if sections.is_empty() {
                println!("No sections yet. Use 'envelope household add-section <name>'.");
                return Ok(());
            }

            for section in &sections {
                println!("{}", section.name);
                for category in categories.iter().filter(|c| c.section_id == section.id) {
                    println!("  {}", category.name);
                }
            }
        }
    }

    Ok(())
}
