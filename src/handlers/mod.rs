pub mod assets;
pub mod board;
pub mod index;
pub mod refresh;

use std::net::IpAddr;
use governor::{ RateLimiter, clock::DefaultClock };
use governor::state::keyed::DefaultKeyedStateStore;

pub type RefreshLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;
