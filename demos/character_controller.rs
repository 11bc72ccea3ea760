//! Character Controller
//!
//! This example drives a game character through a hierarchical state machine.
//!
//! Key concepts:
//! - Substates (Walk and Run live under Move)
//! - Payload-typed transition tables (key presses as `char`)
//! - Falling back to the parent state's table
//! - Excite without leaving the current state
//! - Subscribing to completed transitions
//!
//! Run with: cargo run --example character_controller

use statetree::core::{Resolution, TriggerKind};
use statetree::{state_enum, CallbackError, StateMachineBuilder};

state_enum! {
    enum Stance {
        Idle,
        Move,
        Walk,
        Run,
        Air,
        Jump,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Character Controller ===\n");

    let machine = StateMachineBuilder::new()
        .initial(Stance::Idle)
        .name("character")
        .substates(Stance::Move, [Stance::Walk, Stance::Run])
        .substate(Stance::Jump, Stance::Air)
        .build()?;

    for state in Stance::ALL.iter().copied() {
        let config = machine.configure(state)?;
        config.on_entry(move || {
            println!("  enter {state}");
            std::future::ready(Ok(()))
        });
        config.on_exit(move || {
            println!("  exit  {state}");
            std::future::ready(Ok(()))
        });
    }
    machine.configure(Stance::Move)?.on_excite(|| {
        println!("  footstep sound");
        std::future::ready(Ok(()))
    });
    machine.configure(Stance::Jump)?.on_entry(|| async {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        Ok::<(), CallbackError>(())
    });

    machine
        .table_for::<char>(Stance::Idle)?
        .register_static('w', Stance::Walk, TriggerKind::Transition)?;
    let walk = machine.table_for::<char>(Stance::Walk)?;
    walk.register_static('r', Stance::Run, TriggerKind::Transition)?;
    walk.register_static('f', Stance::Move, TriggerKind::Excite)?;
    machine
        .table_for::<char>(Stance::Run)?
        .register_static('w', Stance::Walk, TriggerKind::Transition)?;
    // Any stance under Move can jump or stop.
    machine
        .table_for::<char>(Stance::Move)?
        .register_dynamic(|key| match *key {
            ' ' => Resolution::Transition(Stance::Jump),
            's' => Resolution::Transition(Stance::Idle),
            _ => Resolution::Ignore,
        });
    machine
        .table_for::<char>(Stance::Jump)?
        .register_static('l', Stance::Idle, TriggerKind::Transition)?;

    let mut transitions = machine.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = 0;
        while let Some(record) = transitions.next_transition().await {
            seen += 1;
            println!("  [{}] {} -> {} ({})", seen, record.from, record.to, record.kind);
        }
        seen
    });

    for key in ['w', 'f', 'r', 'x', ' ', 'l'] {
        println!("\nkey {key:?} in {}:", machine.current_state());
        match machine.dispatch(key).await? {
            Some(_) => println!("  now {}", machine.current_state()),
            None => println!("  ignored"),
        }
    }

    println!("\nPath taken: {:?}", machine.history().get_path());

    machine.dispose().await?;
    let seen = observer.await?;
    println!("Observer saw {seen} transitions");

    println!("\n=== Example Complete ===");
    Ok(())
}
