//! # Conflict Subcommand
//!
//! - `list`: a contract's conflicts, grouped by the party that raised them.
//! - `report`: raise a conflict on an active contract as the acting party.
//! - `status`: move a conflict through review (admin).

use anyhow::Result;
use clap::{Args, Subcommand};

use sfl_arbitration::{ConflictReason, ConflictReport, ConflictStatus, ContractConflict};
use sfl_core::{ConflictId, ContractId};
use sfl_lifecycle::ContractSession;
use sfl_state::Party;

use crate::context::Context;
use crate::finish;

#[derive(Args, Debug)]
pub struct ConflictArgs {
    #[command(subcommand)]
    pub command: ConflictCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConflictCommand {
    /// List a contract's conflicts.
    List {
        #[arg(long)]
        contract: u64,
    },

    /// Report a conflict on a contract.
    Report {
        #[arg(long)]
        contract: u64,
        /// A listed reason such as "Payment Dispute" or PAYMENT_DISPUTE.
        #[arg(long)]
        reason: ConflictReason,
        #[arg(long)]
        description: String,
        /// Link to supporting evidence.
        #[arg(long)]
        evidence: Option<String>,
    },

    /// Change a conflict's status (admin).
    Status {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        to: ConflictStatus,
    },
}

pub async fn run_conflict(args: &ConflictArgs, ctx: &Context) -> Result<u8> {
    let manager = ctx.manager.clone();
    let actor = ctx.actor;

    let code = match &args.command {
        ConflictCommand::List { contract } => {
            let contract = match manager.load(&actor, ContractId(*contract)).await {
                Ok(contract) => contract,
                Err(e) => return Ok(crate::exit_code(&e)),
            };
            finish(manager.conflicts(&contract).await, |groups| {
                for party in [Party::Client, Party::Freelancer] {
                    println!("raised by {party}:");
                    for conflict in groups.raised_by(party) {
                        print_conflict(conflict);
                    }
                }
                if !groups.is_consistent() {
                    println!("unattributed:");
                    for inconsistency in &groups.inconsistencies {
                        print_conflict(&inconsistency.conflict);
                    }
                }
            })
        }
        ConflictCommand::Report {
            contract,
            reason,
            description,
            evidence,
        } => {
            let session = match ContractSession::open(manager, actor, ContractId(*contract)).await {
                Ok(session) => session,
                Err(e) => return Ok(crate::exit_code(&e)),
            };
            let report = ConflictReport::new(actor.id, reason.clone(), description.clone(), evidence.clone());
            finish(session.report_conflict(report).await, |reported| {
                println!(
                    "{} on {} ({})",
                    reported.conflict.id,
                    reported.contract.id,
                    if reported.flagged {
                        reported.contract.status.label()
                    } else {
                        "status unchanged"
                    }
                );
            })
        }
        ConflictCommand::Status { id, to } => {
            finish(
                manager.update_conflict_status(&actor, ConflictId(*id), *to).await,
                |conflict| println!("{} {}", conflict.id, conflict.status),
            )
        }
    };
    Ok(code)
}

fn print_conflict(conflict: &ContractConflict) {
    println!(
        "  {:>6}  {:<10}  {:<24}  {}",
        conflict.id.get(),
        conflict.status.as_str(),
        conflict.reason.label(),
        conflict.description
    );
}
