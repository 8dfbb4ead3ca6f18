//! # Seed Subcommand
//!
//! Registers a client and a freelancer in the User Directory and drafts a
//! sample contract between them. Meant for a fresh `sfl-store-stub`.

use anyhow::{Context as _, Result};
use chrono::{Duration, Utc};
use clap::Args;

use sfl_core::{ActorContext, Amount};
use sfl_state::ContractDraft;
use sfl_store_client::NewUser;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Budget of the sample contract.
    #[arg(long, default_value = "500")]
    pub amount: Amount,
}

pub async fn run_seed(args: &SeedArgs, ctx: &Context) -> Result<u8> {
    let users = ctx.client.users();
    let client = users
        .create(&NewUser {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            role: "CLIENT".into(),
            email: "grace@example.com".into(),
        })
        .await
        .context("creating client user")?;
    let freelancer = users
        .create(&NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: "FREELANCER".into(),
            email: "ada@example.com".into(),
        })
        .await
        .context("creating freelancer user")?;

    let today = Utc::now().date_naive();
    let draft = ContractDraft {
        client_id: client.id,
        freelancer_id: freelancer.id,
        project_application_id: None,
        offer_application_id: None,
        title: "Website Redesign".into(),
        description: Some("Rebuild the marketing site.".into()),
        terms: "Deliverables in three milestones, each invoiced net 15.".into(),
        amount: args.amount,
        start_date: today + Duration::days(7),
        end_date: today + Duration::days(37),
    };
    let actor = ActorContext::client(client.id);
    let contract = match ctx.manager.create_contract(&actor, &draft, today).await {
        Ok(contract) => contract,
        Err(e) => return Ok(crate::exit_code(&e)),
    };

    println!("client      {}", client.id);
    println!("freelancer  {}", freelancer.id);
    println!("contract    {}", contract.id);
    Ok(0)
}
