//! Transfer state machine
//!
//! A [`Transfer`] holds one [`State`] at a time and moves between them on
//! [`Transfer::tick`]. Nothing ever waits. A state that has no progress to
//! make returns and tries again on the next tick.
//!
//! The states are:
//!
//! * **Initialized** - Created, or reset by `start`, not yet running.
//! * **Resolving** - Name lookup of the host in progress. Skipped when the
//!   host is an ip literal.
//! * **Resolved** - Address known, the next tick opens the stream.
//! * **Connecting** - Connect in progress. Once connected the request
//!   prelude is staged and sent.
//! * **PostPayload** - Send the POST body, one chunk per tick.
//! * **ReceivingHeader** - Read the response head up to the empty line.
//! * **ParsingHeader** - Act on the status: read the body on `200`, follow
//!   `301`/`302`, read another head after `100`.
//! * **ReceivingData** - Copy `Content-Length` bytes to the sink.
//! * **Closed** - Done, the sink holds the body.
//! * **Error** - Failed, see [`Transfer::last_error`].
//!
//! ```text
//!                  ┌──────────────────┐
//!   ┌─────────────▶│    Resolving     │──────────────┐
//!   │              └──────────────────┘              │
//!   │                        │                       │
//!   │                        ▼                       │
//!   │              ┌──────────────────┐              │
//!   │   ip ───────▶│     Resolved     │──────────────┤
//!   │              └──────────────────┘              │
//!   │                        │                       │
//!   │                        ▼                       │
//!   │              ┌──────────────────┐              │
//!   │           ┌──│    Connecting    │──────────────┤
//!   │           │  └──────────────────┘              │
//!   │           │            │ POST                  │
//!   │           │            ▼                       │
//!   │           │  ┌──────────────────┐              │
//!   │       GET │  │   PostPayload    │──────────────┤
//!   │           │  └──────────────────┘              │
//!   │           │            │                       │
//!   │           │            ▼                       │
//!   │           └─▶┌──────────────────┐              │
//!   │        ┌────▶│ ReceivingHeader  │──────────────┤
//!   │        │     └──────────────────┘              │
//!   │        │               │                       │
//!   │        │ 100           ▼                       │
//!   │        │     ┌──────────────────┐              │
//!   │        └─────│  ParsingHeader   │──────────────┤
//!   │  301/302     └──────────────────┘              │
//!   └────────────────────────┤ 200                   │
//!                            ▼                       ▼
//!                  ┌──────────────────┐    ┌──────────────────┐
//!                  │  ReceivingData   │───▶│      Error       │
//!                  └──────────────────┘    └──────────────────┘
//!                            │
//!                            ▼
//!                  ┌──────────────────┐
//!                  │      Closed      │
//!                  └──────────────────┘
//! ```
//!
//! The connection timeout counts the time spent since the current target
//! started resolving or connecting. It is measured as the sum of the deltas
//! passed to `tick`, so a redirect restarts it.

mod config;
pub use config::{RequestMethod, TransferConfig};

mod flow;
pub use flow::{State, Transfer};

#[cfg(test)]
mod test;
