//! Track listing command.

use keytone_synth::TrackKind;

pub fn run() -> anyhow::Result<()> {
    println!("Background Tracks");
    println!("=================\n");
    for kind in TrackKind::ALL {
        println!("  {:<12} {}", kind.slug(), kind.name());
    }
    println!();
    println!("Use the short name with --track, e.g. `keytone render out.wav --track lofi`.");
    Ok(())
}
