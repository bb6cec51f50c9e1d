use super::{print_json, Common};
use color_eyre::eyre::eyre;
use color_eyre::Report;
use chain_types::ProposalId;
use liquid_lib::Keeper;
use structopt::StructOpt;
use tally_toolbox::keepers::GovKeeper;
use tally_toolbox::TallyHandler;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Tally {
    #[structopt(flatten)]
    common: Common,

    /// Id of the proposal to tally
    #[structopt(long)]
    proposal: ProposalId,
}

impl Tally {
    pub fn exec(self) -> Result<(), Report> {
        let Self { common, proposal } = self;
        let (config, mut app) = common.load()?;
        let proposal = app
            .proposal(proposal)
            .ok_or_else(|| eyre!("proposal {} not found in {}", proposal, common.state.display()))?;

        let outcome = TallyHandler::new(Keeper::new(config)).tally(&mut app, &proposal)?;
        print_json(&outcome)
    }
}
