//! Test helpers for driving games through a session.

use framekit::{FrameError, Game, LoopConfig, Session};

use crate::games::{
    Asteroids, AsteroidsConfig, Catch, CatchConfig, CoinFlip, CoinFlipConfig, Invaders,
    InvadersConfig, Memory, MemoryConfig, Pong, PongConfig, Tetris, TetrisConfig,
};

/// Installs a fmt subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// One key edge at a given tick.
#[derive(Debug, Clone, Copy)]
pub struct KeyEvent {
    /// Tick before which the edge is delivered
    pub tick: u64,
    /// Key name as the browser reports it
    pub key: &'static str,
    /// `true` for key-down
    pub down: bool,
}

/// Shorthand for a key-down edge.
pub const fn down(tick: u64, key: &'static str) -> KeyEvent {
    KeyEvent { tick, key, down: true }
}

/// Shorthand for a key-up edge.
pub const fn up(tick: u64, key: &'static str) -> KeyEvent {
    KeyEvent { tick, key, down: false }
}

/// Runs `ticks` ticks, delivering each scripted edge before its tick.
pub fn play<G: Game>(
    session: &mut Session<G>,
    script: &[KeyEvent],
    ticks: u64,
) -> Result<(), FrameError> {
    for _ in 0..ticks {
        let now = session.ticks();
        for event in script.iter().filter(|e| e.tick == now) {
            if event.down {
                session.key_down(event.key);
            } else {
                session.key_up(event.key);
            }
        }
        session.step()?;
    }
    Ok(())
}

/// A busy script: start, move both ways, shoot repeatedly, rotate.
pub fn busy_script() -> Vec<KeyEvent> {
    let mut script = vec![down(0, "Enter"), up(1, "Enter")];
    for i in 0..20 {
        let t = 10 + i * 15;
        let key = if i % 2 == 0 { "ArrowLeft" } else { "ArrowRight" };
        script.extend([down(t, key), up(t + 8, key), down(t + 2, " "), up(t + 4, " ")]);
        if i % 3 == 0 {
            script.extend([down(t + 5, "ArrowUp"), up(t + 9, "ArrowUp")]);
        }
    }
    script
}

/// Coin flip session.
pub fn coin_flip(seed: u64) -> Session<CoinFlip> {
    let config = LoopConfig::with_seed(seed);
    Session::new(CoinFlip::new(CoinFlipConfig::default(), &config), &config)
}

/// Tetris session.
pub fn tetris(seed: u64) -> Session<Tetris> {
    let config = LoopConfig::with_seed(seed);
    Session::new(Tetris::new(TetrisConfig::default(), &config), &config)
}

/// Pong session.
pub fn pong(seed: u64) -> Session<Pong> {
    let config = LoopConfig::with_seed(seed);
    Session::new(Pong::new(PongConfig::default(), &config), &config)
}

/// Asteroids session.
pub fn asteroids(seed: u64) -> Session<Asteroids> {
    let config = LoopConfig::with_seed(seed);
    Session::new(Asteroids::new(AsteroidsConfig::default(), &config), &config)
}

/// Space Invaders session.
pub fn invaders(seed: u64) -> Session<Invaders> {
    let config = LoopConfig::with_seed(seed);
    Session::new(Invaders::new(InvadersConfig::default(), &config), &config)
}

/// Bunny Catch session.
pub fn catch(seed: u64) -> Session<Catch> {
    let config = LoopConfig::with_seed(seed);
    Session::new(Catch::new(CatchConfig::default(), &config), &config)
}

/// Memory session.
pub fn memory(seed: u64) -> Session<Memory> {
    let config = LoopConfig::with_seed(seed);
    Session::new(Memory::new(MemoryConfig::default(), &config), &config)
}
