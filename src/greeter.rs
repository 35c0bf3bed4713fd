use std::io::Write;

use tracing::{debug, instrument};

use crate::communication::ProcessGroup;
use crate::error::Result;
use crate::greeting::{Greeting, GREETING_TAG};

/// Every process except the coordinator sends its greeting to rank 0. The coordinator writes its
/// own greeting to `out` and then one line per other process, strictly in ascending rank order:
/// the receive for rank `q` waits for rank `q`, no matter who else has already sent.
#[instrument(level = "debug", skip_all, fields(rank = group.rank(), size = group.size()))]
pub fn run<G, W>(group: &G, out: &mut W) -> Result<()>
where
    G: ProcessGroup + ?Sized,
    W: Write + ?Sized,
{
    let rank = group.rank();
    let size = group.size();

    if !group.is_coordinator() {
        let greeting = Greeting::new(rank, size)?;
        debug!("Process #{rank} sending \"{greeting}\" to #0.");
        group.send(0, GREETING_TAG, &greeting.to_wire())?;
        return Ok(());
    }

    writeln!(out, "{}", Greeting::new(rank, size)?)?;
    for q in 1..size {
        let payload = group.receive(q, GREETING_TAG)?;
        let greeting = Greeting::from_wire(&payload)?;
        debug!("Process #{rank} received \"{greeting}\" from #{q}.");
        writeln!(out, "{greeting}")?;
    }
    out.flush()?;
    Ok(())
}
