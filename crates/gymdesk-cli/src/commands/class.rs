use chrono::NaiveDateTime;
use clap::Subcommand;
use gymdesk_core::booking::{load_summary, resolve_booking_status};
use gymdesk_core::{BanStatus, BookingError, BookingStatus, CoreError, SessionStore};

use crate::context::AppContext;

#[derive(Subcommand)]
pub enum ClassAction {
    /// Countdown to the next class
    Next {
        #[arg(long)]
        json: bool,
    },
    /// Booking status for the upcoming class
    Status {
        /// Member ID
        #[arg(long)]
        member: String,
        #[arg(long)]
        json: bool,
    },
    /// Attendance count, streak and strikes
    Summary {
        /// Member ID
        #[arg(long)]
        member: String,
        #[arg(long)]
        json: bool,
    },
    /// Book a slot in the upcoming class
    Book {
        /// Member ID
        #[arg(long)]
        member: String,
    },
    /// Cancel a booking in the upcoming class
    Cancel {
        /// Member ID
        #[arg(long)]
        member: String,
    },
}

pub fn run(action: ClassAction, now: Option<NaiveDateTime>) -> Result<(), CoreError> {
    let ctx = AppContext::open(now)?;
    match action {
        ClassAction::Next { json } => {
            let countdown = ctx.config.cadence.countdown(ctx.now());
            if json {
                println!("{}", serde_json::to_string_pretty(&countdown)?);
            } else if countdown.in_progress {
                println!("Class in progress (started {})", countdown.target);
            } else {
                println!(
                    "Next class {}: {}d {:02}h {:02}m {:02}s",
                    countdown.target.format("%a %Y-%m-%d %H:%M"),
                    countdown.days,
                    countdown.hours,
                    countdown.minutes,
                    countdown.seconds
                );
            }
        }
        ClassAction::Status { member, json } => {
            let status = resolve_booking_status(
                &ctx.db,
                &ctx.config.cadence,
                ctx.config.booking.capacity,
                &member,
                ctx.now(),
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
        ClassAction::Summary { member, json } => {
            let summary = load_summary(&ctx.db, &ctx.config.attendance(), &member, ctx.now())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let threshold = ctx.config.booking.strikes.threshold;
                println!("Member:      {}", summary.member_id);
                println!("Attended:    {}", summary.attended_count);
                println!("Streak:      {} (best {})", summary.streak, summary.best_streak);
                match summary.last_attended {
                    Some(date) => println!("Last class:  {date}"),
                    None => println!("Last class:  -"),
                }
                println!("Strikes:     {}/{threshold}", summary.strikes);
                if let BanStatus::Active { until } = summary.ban {
                    println!("Banned until {until}");
                }
            }
        }
        ClassAction::Book { member } => {
            let profile = ctx.require_member(&member)?;
            if let BanStatus::Active { until } = profile.ban_status(ctx.now()) {
                return Err(BookingError::Banned {
                    member_id: member,
                    until,
                }
                .into());
            }
            let mut session = ctx.require_session(ctx.next_class_date())?;
            let slot_number = session.book(&member, ctx.config.booking.capacity)?.slot_number;
            ctx.db.put_session(&session)?;
            println!("Booked slot {slot_number} on {}", session.date);
        }
        ClassAction::Cancel { member } => {
            let mut session = ctx.require_session(ctx.next_class_date())?;
            let slot_number = session.cancel(&member)?;
            ctx.db.put_session(&session)?;
            println!("Cancelled slot {slot_number} on {}", session.date);
        }
    }
    Ok(())
}

fn print_status(status: &BookingStatus) {
    match status {
        BookingStatus::Banned { until } => println!("Banned from booking until {until}"),
        BookingStatus::NotScheduled { date } => println!("No class scheduled for {date} yet"),
        BookingStatus::NotBooked { date, open_slots } => {
            println!("Not booked for {date} ({open_slots} slots open)")
        }
        BookingStatus::Booked {
            date,
            slot_number,
            status,
        } => println!("Slot {slot_number} on {date} ({status})"),
    }
}
