//! Terminal console: questions to stdout, answers from stdin.

use std::io::{self, Write};
use async_trait::async_trait;
use rapport_agent::Console;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

pub struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        println!("\nAI: {question}");
        print!("You: ");
        io::stdout().flush()?;
        self.lines.next_line().await
    }

    fn say(&mut self, text: &str) {
        println!("\n{text}");
    }
}
