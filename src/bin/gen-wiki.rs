//! Outputs the Markdown source for the cod2x-rs modules wiki page.

use std::fmt::Write;

extern crate cod2x_rs;
use cod2x_rs::modules::MODULES;

fn indent(text: &str) -> String {
    text.lines().fold(String::new(), |mut s, l| {
        writeln!(s, "  {l}").unwrap();
        s
    })
}

fn main() {
    println!(
        "\
# cod2x-rs Modules

Each module represents a feature or a set of features of cod2x-rs. Console variables can be set \
from the game console or from a JSON config file.

This wiki page is generated automatically with `src/bin/gen-wiki.rs`. Do not edit it by hand."
    );

    let mut sorted_modules = MODULES.to_vec();
    sorted_modules.sort_unstable_by_key(|m| m.name());

    for module in sorted_modules {
        println!("\n## {}", module.name());

        println!("\n{}", module.description());

        let mut sorted_cvars = module.cvars().to_vec();
        sorted_cvars.sort_unstable_by_key(|c| c.name().to_ascii_lowercase());

        if !sorted_cvars.is_empty() {
            println!("\n### Console Variables");
        }

        for cvar in sorted_cvars {
            println!(
                "\n- `{}` (default: `\"{}\"`)\n\n{}",
                cvar.name(),
                cvar.default_value(),
                indent(cvar.description())
            );
        }
    }
}
