//! Price parsing command

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use shopcheck_common::parse_amount_in;

use crate::output::{print_item, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct PriceArgs {
    /// Price text as rendered, e.g. "1.234,56 €"
    pub text: String,
}

#[derive(Serialize)]
pub struct PriceDisplay {
    pub input: String,
    pub amount: f64,
}

impl TableDisplay for PriceDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Input", "Amount"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.input.clone(), format!("{:.2}", self.amount)]
    }
}

pub fn execute(args: PriceArgs, format: OutputFormat) -> Result<()> {
    let amount = parse_amount_in(&args.text)?;
    print_item(
        &PriceDisplay {
            input: args.text,
            amount,
        },
        format,
    );
    Ok(())
}
