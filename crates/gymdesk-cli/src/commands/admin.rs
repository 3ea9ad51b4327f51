use chrono::{NaiveDate, NaiveDateTime};
use clap::Subcommand;
use gymdesk_core::{CoreError, Member, MemberStore, SessionRecord, SessionStore, SlotStatus, StrikeOutcome};

use crate::context::AppContext;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Register a member
    MemberAdd {
        #[arg(long)]
        name: String,
        /// Explicit member ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// List members
    Members {
        #[arg(long)]
        json: bool,
    },
    /// Open the session document for the upcoming class
    Schedule {
        /// Class date (defaults to the next class)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Set a member's slot status
    Mark {
        #[arg(long)]
        member: String,
        /// booked, confirmed, attended, no_show or cancelled
        #[arg(long)]
        status: SlotStatus,
        /// Class date (defaults to the current or last class)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Mark a no-show and record a strike
    NoShow {
        #[arg(long)]
        member: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List the slots of a session
    Roster {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: AdminAction, now: Option<NaiveDateTime>) -> Result<(), CoreError> {
    let ctx = AppContext::open(now)?;
    match action {
        AdminAction::MemberAdd { name, id } => {
            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let member = Member::new(id, name);
            ctx.db.put_member(&member)?;
            println!("Member added: {} ({})", member.name, member.id);
        }
        AdminAction::Members { json } => {
            let members = ctx.db.members()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&members)?);
            } else if members.is_empty() {
                println!("No members.");
            } else {
                let policy = &ctx.config.booking.strikes;
                for member in &members {
                    let banned = if member.ban_status(ctx.now()).is_active() {
                        " [banned]"
                    } else {
                        ""
                    };
                    println!(
                        "{}  {}  strikes {}/{}{banned}",
                        member.id,
                        member.name,
                        policy.displayed_strikes(member),
                        policy.threshold
                    );
                }
            }
        }
        AdminAction::Schedule { date } => {
            let date = date.unwrap_or_else(|| ctx.next_class_date());
            if ctx.db.session(date)?.is_some() {
                println!("Session {date} already open");
            } else {
                ctx.db.put_session(&SessionRecord::new(date))?;
                println!("Session {date} opened ({} slots)", ctx.config.booking.capacity);
            }
        }
        AdminAction::Mark {
            member,
            status,
            date,
        } => mark(&ctx, &member, status, date)?,
        AdminAction::NoShow { member, date } => mark(&ctx, &member, SlotStatus::NoShow, date)?,
        AdminAction::Roster { date, json } => {
            let date = date.unwrap_or_else(|| ctx.next_class_date());
            let session = ctx.require_session(date)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                println!(
                    "Session {date}: {}/{} taken",
                    session.taken(),
                    ctx.config.booking.capacity
                );
                for slot in &session.slots {
                    println!("  #{:<3} {}  {}", slot.slot_number, slot.member_id, slot.status);
                }
            }
        }
    }
    Ok(())
}

/// A transition into `NoShow` records exactly one strike. The slot and the
/// member are written together, and only after both have been resolved.
fn mark(
    ctx: &AppContext,
    member_id: &str,
    status: SlotStatus,
    date: Option<NaiveDate>,
) -> Result<(), CoreError> {
    let date = date.unwrap_or_else(|| ctx.current_class_date());
    let mut session = ctx.require_session(date)?;
    let previous = session.mark(member_id, status, ctx.config.booking.capacity)?;

    let strike = if status == SlotStatus::NoShow && previous != SlotStatus::NoShow {
        let mut member = ctx.require_member(member_id)?;
        let outcome = ctx.config.booking.strikes.record_no_show(&mut member, ctx.now());
        Some((member, outcome))
    } else {
        None
    };

    ctx.db.atomically(|db| {
        if let Some((member, _)) = &strike {
            db.put_member(member)?;
        }
        db.put_session(&session)
    })?;

    println!("{member_id} on {date}: {previous} -> {status}");
    match strike.map(|(_, outcome)| outcome) {
        Some(StrikeOutcome::Strike { strikes, remaining }) => {
            println!("Strike {strikes} recorded ({remaining} before a ban)")
        }
        Some(StrikeOutcome::Banned { until }) => println!("Banned from booking until {until}"),
        None => {}
    }
    Ok(())
}
