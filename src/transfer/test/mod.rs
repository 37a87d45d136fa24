use std::time::Duration;






mod state_recv_header;


mod state_redirect;


mod test_timeout;


/// Delta passed to every scenario tick.
const TICK: Duration = Duration::from_millis(100);

const MAX_TICKS: usize = 10_000;
