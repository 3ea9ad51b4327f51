mod attendance;
mod cadence;
mod member;
mod policy;
mod session;
mod status;

pub use attendance::{AttendanceCalculator, AttendanceSummary};
pub use cadence::{CadenceRule, Countdown};
pub use member::{BanStatus, Member};
pub use policy::{StrikeOutcome, StrikePolicy};
pub use session::{SessionRecord, Slot, SlotStatus};
pub use status::{load_summary, resolve_booking_status, BookingStatus};
