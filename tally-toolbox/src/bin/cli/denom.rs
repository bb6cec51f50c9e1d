use super::ConfigArg;
use chain_types::ValAddress;
use color_eyre::Report;
use liquid_lib::{liquid_staking_token_denom, parse_liquid_staking_token_denom};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Denom {
    /// Print the derivative denom of a validator
    Format {
        #[structopt(flatten)]
        config: ConfigArg,
        /// Bech32 validator operator address
        #[structopt(long)]
        validator: String,
    },
    /// Print the validator behind a derivative denom
    Parse {
        #[structopt(flatten)]
        config: ConfigArg,
        denom: String,
    },
}

impl Denom {
    pub fn exec(self) -> Result<(), Report> {
        match self {
            Denom::Format { config, validator } => {
                let config = config.load()?;
                let validator = ValAddress::from_bech32(&config, &validator)?;
                println!("{}", liquid_staking_token_denom(&config, &validator));
            }
            Denom::Parse { config, denom } => {
                let config = config.load()?;
                let validator = parse_liquid_staking_token_denom(&config, &denom)?;
                println!("{}", validator.to_bech32(&config));
            }
        }
        Ok(())
    }
}
