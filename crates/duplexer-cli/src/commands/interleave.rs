use anyhow::{Context, Result};
use duplexer_pdf::{InterleaveOptions, PdfDuplexer};

use crate::cli::InterleaveArgs;

pub fn execute(args: InterleaveArgs) -> Result<()> {
    let duplexer = PdfDuplexer::new(InterleaveOptions {
        reverse_backs: args.reverse_backs,
        insert_blank_lastback: args.insert_blank_lastback,
    });

    duplexer
        .interleave(&args.input, &args.output)
        .with_context(|| format!("Failed to interleave {}", args.input.display()))?;
    println!("Successfully wrote {}", args.output.display());
    Ok(())
}
