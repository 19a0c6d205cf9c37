/// Events emitted during a simulation step.
/// The presentation layer consumes these for messages and logging; a
/// sound layer would key its effects off the same list.

use crate::domain::entity::EnemyKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jump,
    MakeBlock,
    ThrowBlock,
    /// A tossed block stunned an enemy.
    Knock { kind: EnemyKind },
    /// A crouching sneaker shrugged off a block.
    SneakerDeflected,
    EnemySpawned { kind: EnemyKind },
    EnemyDestroyed { kind: EnemyKind },
    PlayerHurt { health: u32 },
    DoorOpened,
    RoomCleared,
    PlayerDied,
}
