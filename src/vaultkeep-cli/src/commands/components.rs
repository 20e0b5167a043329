//! Component list for snapshot fetches

use vaultkeep::inventory::{components_param, required_components};

pub fn handle(with_perks: bool) {
    println!("{}", components_param(&required_components(with_perks)));
}
