use bevy::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ends the frame loop once cancelled. Escape cancels it too.
pub struct ShutdownPlugin;

impl Plugin for ShutdownPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShutdownToken>().add_systems(
            Update,
            (cancel_on_escape_system, exit_when_cancelled_system).chain(),
        );
    }
}

/// Cancellation flag shared with anything that wants to stop the app,
/// including other threads.
#[derive(Resource, Clone, Default, Debug)]
pub struct ShutdownToken(Arc<AtomicBool>);

impl ShutdownToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

fn cancel_on_escape_system(keys: Res<ButtonInput<KeyCode>>, token: Res<ShutdownToken>) {
    if keys.just_pressed(KeyCode::Escape) {
        token.cancel();
    }
}

fn exit_when_cancelled_system(token: Res<ShutdownToken>, mut exit: EventWriter<AppExit>) {
    if token.is_cancelled() {
        info!("Shutdown requested, exiting");
        exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<ButtonInput<KeyCode>>()
            .add_plugins(ShutdownPlugin);
        app
    }

    #[test]
    fn test_runs_until_cancelled() {
        let mut app = test_app();
        app.update();
        app.update();
        assert!(app.should_exit().is_none());

        let token = app.world().resource::<ShutdownToken>().clone();
        std::thread::spawn(move || token.cancel())
            .join()
            .expect("cancel thread");
        app.update();
        assert_eq!(app.should_exit(), Some(AppExit::Success));
    }

    #[test]
    fn test_escape_cancels() {
        let mut app = test_app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();
        assert!(app.world().resource::<ShutdownToken>().is_cancelled());
        assert_eq!(app.should_exit(), Some(AppExit::Success));
    }
}
