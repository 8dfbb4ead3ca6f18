//! # Contract Subcommand
//!
//! - `list`: contracts visible to the acting user, with per-status counts.
//! - `show`: one contract, its party names, allowed actions and conflicts.
//! - `create`: draft a contract (client).
//! - `update`: edit a draft (client).
//! - `submit`: DRAFT → PENDING_SIGNATURE (client).
//! - `sign`: add the acting party's signature.
//! - `reject`: PENDING_SIGNATURE → DRAFT (freelancer).
//! - `propose`: edit and return to DRAFT in one step (freelancer).
//! - `withdraw`: return to DRAFT, optionally with edits (client).
//! - `complete`: ACTIVE → COMPLETED (client).
//! - `status`: override the status (admin).
//! - `delete`: delete a contract.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};

use sfl_core::{Amount, ContractId, UserId};
use sfl_lifecycle::{ContractSession, PartyNames, SignOutcome};
use sfl_state::{Contract, ContractDraft, ContractPatch, ContractStatus, Eligibility, Party, StatusCounts, StatusFilter};

use crate::context::Context;
use crate::finish;

#[derive(Args, Debug)]
pub struct ContractArgs {
    #[command(subcommand)]
    pub command: ContractCommand,
}

/// Optional field edits shared by `update`, `propose` and `withdraw`.
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub terms: Option<String>,
    #[arg(long)]
    pub amount: Option<Amount>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

impl EditArgs {
    pub fn to_patch(&self) -> ContractPatch {
        ContractPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            terms: self.terms.clone(),
            amount: self.amount,
            start_date: self.start,
            end_date: self.end,
            status: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ContractCommand {
    /// List contracts visible to the acting user.
    List {
        /// ALL or a status such as PENDING_SIGNATURE.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one contract.
    Show {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        json: bool,
    },

    /// Draft a new contract as the acting client.
    Create {
        /// Freelancer user id.
        #[arg(long)]
        freelancer: u64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        terms: String,
        #[arg(long)]
        amount: Amount,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        description: Option<String>,
    },

    /// Edit a draft.
    Update {
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        edit: EditArgs,
    },

    /// Send a draft out for signature.
    Submit {
        #[arg(long)]
        id: u64,
    },

    /// Sign as the acting party.
    Sign {
        #[arg(long)]
        id: u64,
        /// Signature image as a data URL.
        #[arg(long)]
        signature: String,
    },

    /// Send a contract awaiting signature back to draft.
    Reject {
        #[arg(long)]
        id: u64,
    },

    /// Propose edits; the contract returns to draft.
    Propose {
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        edit: EditArgs,
    },

    /// Withdraw a contract awaiting signature back to draft.
    Withdraw {
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        edit: EditArgs,
    },

    /// Mark an active contract as completed.
    Complete {
        #[arg(long)]
        id: u64,
    },

    /// Override the status (admin).
    Status {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        to: ContractStatus,
    },

    /// Delete a contract.
    Delete {
        #[arg(long)]
        id: u64,
    },
}

pub async fn run_contract(args: &ContractArgs, ctx: &Context) -> Result<u8> {
    let manager = ctx.manager.clone();
    let actor = ctx.actor;

    let code = match &args.command {
        ContractCommand::List { status, json } => {
            let result = manager.list_contracts(&actor, *status).await;
            finish(result, |contracts| print_list(&contracts, *json))
        }
        ContractCommand::Show { id, json } => {
            let contract = match manager.load(&actor, ContractId(*id)).await {
                Ok(contract) => contract,
                Err(e) => return Ok(crate::exit_code(&e)),
            };
            let names = manager.party_names(&contract).await;
            if *json {
                println!("{}", serde_json::to_string_pretty(&contract)?);
            } else {
                print_contract(&contract, &names);
                println!(
                    "  actions:    {}",
                    Eligibility::evaluate(&contract, &actor).granted().join(", ")
                );
                if let Ok(groups) = manager.conflicts(&contract).await {
                    if !groups.is_empty() {
                        println!(
                            "  conflicts:  {} ({} unresolved)",
                            groups.len(),
                            groups.unresolved()
                        );
                    }
                }
            }
            0
        }
        ContractCommand::Create {
            freelancer,
            title,
            terms,
            amount,
            start,
            end,
            description,
        } => {
            let draft = ContractDraft {
                client_id: actor.id,
                freelancer_id: UserId(*freelancer),
                project_application_id: None,
                offer_application_id: None,
                title: title.clone(),
                description: description.clone(),
                terms: terms.clone(),
                amount: *amount,
                start_date: *start,
                end_date: *end,
            };
            let today = Utc::now().date_naive();
            finish(manager.create_contract(&actor, &draft, today).await, |c| {
                println!("{}", c.id)
            })
        }
        ContractCommand::Update { id, edit } => {
            with_session(ctx, *id, |s| async move { s.update(edit.to_patch()).await }).await
        }
        ContractCommand::Submit { id } => {
            with_session(ctx, *id, |s| async move { s.submit_for_signature().await }).await
        }
        ContractCommand::Sign { id, signature } => {
            let session = match ContractSession::open(manager, actor, ContractId(*id)).await {
                Ok(session) => session,
                Err(e) => return Ok(crate::exit_code(&e)),
            };
            finish(session.sign(signature.clone()).await, |outcome| match outcome {
                SignOutcome::Activated(c) => println!("{} {}", c.id, c.status),
                SignOutcome::AwaitingOtherParty(c) => {
                    let waiting = [Party::Client, Party::Freelancer]
                        .into_iter()
                        .find(|p| !c.has_signed(*p))
                        .map(|p| p.to_string())
                        .unwrap_or_default();
                    println!("{} {} (waiting for {waiting})", c.id, c.status)
                }
            })
        }
        ContractCommand::Reject { id } => {
            with_session(ctx, *id, |s| async move { s.reject().await }).await
        }
        ContractCommand::Propose { id, edit } => {
            with_session(ctx, *id, |s| async move { s.propose_changes(edit.to_patch()).await }).await
        }
        ContractCommand::Withdraw { id, edit } => {
            let patch = edit.to_patch();
            let patch = (!patch.is_empty()).then_some(patch);
            with_session(ctx, *id, |s| async move { s.withdraw(patch).await }).await
        }
        ContractCommand::Complete { id } => {
            with_session(ctx, *id, |s| async move { s.complete().await }).await
        }
        ContractCommand::Status { id, to } => {
            let to = *to;
            with_session(ctx, *id, |s| async move { s.override_status(to).await }).await
        }
        ContractCommand::Delete { id } => {
            let session = match ContractSession::open(manager, actor, ContractId(*id)).await {
                Ok(session) => session,
                Err(e) => return Ok(crate::exit_code(&e)),
            };
            finish(session.delete().await, |deleted| {
                println!("{}", if deleted { "deleted" } else { "not found" })
            })
        }
    };
    Ok(code)
}

/// Open a session on `id`, run one action, print the resulting contract.
async fn with_session<Fut>(
    ctx: &Context,
    id: u64,
    action: impl FnOnce(ContractSession) -> Fut,
) -> u8
where
    Fut: std::future::Future<Output = Result<Contract, sfl_lifecycle::LifecycleError>>,
{
    match ContractSession::open(ctx.manager.clone(), ctx.actor, ContractId(id)).await {
        Ok(session) => finish(action(session).await, |c| println!("{} {}", c.id, c.status)),
        Err(e) => crate::exit_code(&e),
    }
}

fn print_list(contracts: &[Contract], json: bool) {
    if json {
        match serde_json::to_string_pretty(contracts) {
            Ok(out) => println!("{out}"),
            Err(e) => tracing::error!(error = %e, "failed to encode contracts"),
        }
        return;
    }
    for c in contracts {
        println!(
            "{:>6}  {:<18}  {:>10}  {}",
            c.id.get(),
            c.status.label(),
            c.amount.to_string(),
            c.title
        );
    }
    let counts = StatusCounts::tally(contracts);
    let summary: Vec<String> = ContractStatus::ALL
        .iter()
        .filter(|s| counts.of(**s) > 0)
        .map(|s| format!("{} {}", counts.of(*s), s.label()))
        .collect();
    if summary.is_empty() {
        println!("{} total", counts.total());
    } else {
        println!("{} total: {}", counts.total(), summary.join(", "));
    }
}

fn print_contract(c: &Contract, names: &PartyNames) {
    let signed = |party: Party| if c.has_signed(party) { "signed" } else { "not signed" };
    println!("{}  {}", c.id, c.title);
    println!("  status:     {}", c.status.label());
    println!("  client:     {} ({})  {}", names.client, c.client_id, signed(Party::Client));
    println!(
        "  freelancer: {} ({})  {}",
        names.freelancer,
        c.freelancer_id,
        signed(Party::Freelancer)
    );
    println!("  amount:     {}", c.amount);
    println!("  period:     {} to {}", c.start_date, c.end_date);
    if let Some(signed_at) = &c.signed_at {
        println!("  signed at:  {signed_at}");
    }
}
