//! Transfer‑ und Kernel‑Zeitlinie, als CSV exportierbar.
#![cfg(feature = "memtrace")]

use once_cell::sync::Lazy;
use std::{fs::File, io::{self, Write}, path::Path, sync::Mutex, time::Instant};

/// Transfer‑Richtung oder Kernel‑Event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dir { H2D, D2H, Kernel }

impl Dir {
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::H2D    => "H2D",
            Dir::D2H    => "D2H",
            Dir::Kernel => "Kernel",
        }
    }
}

/// globaler Nullpunkt – wird beim ersten start() initialisiert
static T0: Lazy<Instant> = Lazy::new(Instant::now);

/// (start, end, bytes, dir, idle)
type Row = (u128, u128, usize, &'static str, u128);

static LOG: Lazy<Mutex<Vec<Row>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Token hält Startzeit, Größe & Richtung
#[must_use]
pub struct CopyToken {
    start: Instant,
    bytes: usize,
    dir: Dir,
}

pub fn start(dir: Dir, bytes: usize) -> CopyToken {
    Lazy::force(&T0);
    CopyToken { start: Instant::now(), bytes, dir }
}

impl CopyToken {
    /// schließt den Eintrag ab, idle = Lücke zum vorherigen Ende
    pub fn finish(self) {
        let t0 = *T0;
        let s  = self.start.duration_since(t0).as_micros();
        let e  = Instant::now().duration_since(t0).as_micros();

        if let Ok(mut log) = LOG.lock() {
            let prev_end = log.last().map(|row| row.1).unwrap_or(0);
            log.push((s, e, self.bytes, self.dir.as_str(), s.saturating_sub(prev_end)));
        }
    }
}

/// Anzahl bisher aufgezeichneter Einträge je Richtung
pub fn count(dir: Dir) -> usize {
    LOG.lock()
        .map(|log| log.iter().filter(|row| row.3 == dir.as_str()).count())
        .unwrap_or(0)
}

/// CSV schreiben – einmal am Programmende aufrufen
pub fn flush_csv(path: impl AsRef<Path>) -> io::Result<()> {
    let mut f = File::create(path)?;
    writeln!(f, "t_start_us,t_end_us,bytes,dir,idle_us")?;
    let log = LOG.lock().map_err(|_| io::Error::other("memtrace log poisoned"))?;
    for (s, e, b, d, idle) in log.iter() {
        writeln!(f, "{},{},{},{},{}", s, e, b, d, idle)?;
    }
    Ok(())
}
