use physics::{Action, ArenaConfig, BotId, BotView};
use sandbox::{LoadedBot, SandboxError};

/// One competitor as seen by the match engine.
///
/// `LoadedBot` is the production implementation; tests drive the engine with
/// scripted bots.
pub trait Bot {
    fn id(&self) -> BotId;
    fn name(&self) -> &str;
    fn call_init(&mut self, config: &ArenaConfig) -> Result<(), SandboxError>;
    fn call_update(&mut self, view: &BotView) -> Result<(), SandboxError>;
    /// The action to apply this tick.
    fn consume_action(&self) -> Action;

    fn color(&self) -> Option<[f32; 3]> {
        None
    }

    /// Fuel burned by the most recent call.
    fn fuel_used(&self) -> u64 {
        0
    }
}

impl Bot for LoadedBot {
    fn id(&self) -> BotId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn call_init(&mut self, config: &ArenaConfig) -> Result<(), SandboxError> {
        LoadedBot::call_init(self, config)
    }

    fn call_update(&mut self, view: &BotView) -> Result<(), SandboxError> {
        LoadedBot::call_update(self, view)
    }

    fn consume_action(&self) -> Action {
        LoadedBot::consume_action(self)
    }

    fn color(&self) -> Option<[f32; 3]> {
        LoadedBot::color(self)
    }

    fn fuel_used(&self) -> u64 {
        self.last_fuel_used()
    }
}

impl<B: Bot + ?Sized> Bot for Box<B> {
    fn id(&self) -> BotId {
        (**self).id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn call_init(&mut self, config: &ArenaConfig) -> Result<(), SandboxError> {
        (**self).call_init(config)
    }

    fn call_update(&mut self, view: &BotView) -> Result<(), SandboxError> {
        (**self).call_update(view)
    }

    fn consume_action(&self) -> Action {
        (**self).consume_action()
    }

    fn color(&self) -> Option<[f32; 3]> {
        (**self).color()
    }

    fn fuel_used(&self) -> u64 {
        (**self).fuel_used()
    }
}
