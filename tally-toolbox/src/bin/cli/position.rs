use super::{print_json, Common};
use chain_types::AccAddress;
use color_eyre::Report;
use liquid_lib::Keeper;
use serde::Serialize;
use structopt::StructOpt;
use tally_toolbox::{liquid_position, LiquidPosition};

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Position {
    #[structopt(flatten)]
    common: Common,

    /// Bech32 account address
    #[structopt(long)]
    address: String,
}

#[derive(Serialize)]
struct Output {
    address: String,
    #[serde(flatten)]
    position: LiquidPosition,
}

impl Position {
    pub fn exec(self) -> Result<(), Report> {
        let (config, app) = self.common.load()?;
        let address = AccAddress::from_bech32(&config, &self.address)?;
        let position = liquid_position(&Keeper::new(config), &app, &address)?;
        print_json(&Output {
            address: self.address,
            position,
        })
    }
}
