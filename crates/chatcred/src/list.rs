// SPDX-FileCopyrightText: 2026 Chatcred Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatcred credential list` output.

use chatcred_vault::CredentialListing;

pub fn print_listing(listing: &[CredentialListing], json: bool, use_color: bool) {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(listing).unwrap_or_else(|_| "[]".to_string())
        );
        return;
    }

    println!();
    println!("  chatcred credentials");
    println!("  {}", "-".repeat(35));

    if listing.is_empty() {
        println!("    (none stored)");
        println!();
        return;
    }

    let width = listing
        .iter()
        .map(|item| item.network.len())
        .max()
        .unwrap_or(0);

    for item in listing {
        let context = item.context.to_string();
        if use_color {
            use colored::Colorize;
            println!(
                "    {:<width$}  {:<16} {}",
                item.network.bold(),
                context.cyan(),
                item.display
            );
        } else {
            println!("    {:<width$}  {:<16} {}", item.network, context, item.display);
        }
    }
    println!();
}
