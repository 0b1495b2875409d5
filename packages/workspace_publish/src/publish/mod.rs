//! Package publishing operations for Cargo workspaces.
//!
//! This module runs `cargo publish --dry-run` and `cargo publish` for each
//! local package, in order, with operator confirmation in between.

mod cargo_ops;
mod publisher;
mod runner;

pub use cargo_ops::{CargoPublisher, PublishConfig, PublishResult};
pub use publisher::{PublishEvent, Publisher, PublisherConfig, PublishingResult};
pub use runner::{
    locate_cargo, CommandOutput, CommandRunner, Invocation, ProcessRunner,
    DEFAULT_OPERATION_TIMEOUT,
};

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted stand-ins for cargo and the operator.

    use super::{CommandOutput, CommandRunner, Invocation};
    use crate::error::Result;
    use crate::prompt::Confirmer;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued outputs and records every invocation.
    /// Once the queue is empty every command succeeds with no output.
    #[derive(Debug, Default)]
    pub struct ScriptedRunner {
        outputs: Mutex<VecDeque<CommandOutput>>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&self, output: CommandOutput) {
            self.outputs.lock().unwrap().push_back(output);
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(invocation.clone());
            let next = self.outputs.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| CommandOutput::ok("")))
        }
    }

    /// Answers questions from a fixed list, then declines.
    #[derive(Debug, Default)]
    pub struct ScriptedConfirmer {
        answers: VecDeque<bool>,
        questions: Vec<String>,
    }

    impl ScriptedConfirmer {
        pub fn new(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                questions: Vec::new(),
            }
        }

        pub fn questions(&self) -> &[String] {
            &self.questions
        }
    }

    impl Confirmer for ScriptedConfirmer {
        fn confirm(&mut self, message: &str) -> Result<bool> {
            self.questions.push(message.to_string());
            Ok(self.answers.pop_front().unwrap_or(false))
        }
    }
}
