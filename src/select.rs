use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use unwrap_or::unwrap_ok_or;

use crate::{
    error::{Error, Result},
    google::CourseWork,
    say,
};

pub const ALL_COURSE_WORKS: &str = "All course works";

/// Numbered menus answered one line at a time.
pub struct Selector<R> {
    input: R,
}

impl<R: AsyncBufRead + Unpin> Selector<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Prints `items` as a 1-based list and reads lines until one holds a
    /// number in range. There is no retry limit; only the end of input stops
    /// the loop.
    pub async fn choose<'a, T>(
        &mut self,
        out: &mut dyn Write,
        prompt: &str,
        items: &'a [T],
        label: impl Fn(&T) -> &str,
    ) -> Result<&'a T> {
        if items.is_empty() {
            return Err(stdin_err(io::ErrorKind::InvalidInput, "nothing to choose from"));
        }

        say!(out, "{prompt}");
        for (i, item) in items.iter().enumerate() {
            say!(out, "{}. {}", i + 1, label(item));
        }

        let mut line = String::new();
        loop {
            line.clear();
            let n = self
                .input
                .read_line(&mut line)
                .await
                .map_err(|e| Error::io("<stdin>", e))?;
            if n == 0 {
                return Err(stdin_err(
                    io::ErrorKind::UnexpectedEof,
                    "input ended before a choice was made",
                ));
            }

            let choice = unwrap_ok_or!(line.trim().parse::<usize>(), _e, {
                say!(out, "Enter a number from 1 to {}", items.len());
                continue;
            });

            if let Some(item) = choice.checked_sub(1).and_then(|i| items.get(i)) {
                say!(out, "Chosen: {}", label(item));
                return Ok(item);
            }
            say!(out, "Enter a number from 1 to {}", items.len());
        }
    }
}

fn stdin_err(kind: io::ErrorKind, msg: &str) -> Error {
    Error::io("<stdin>", io::Error::new(kind, msg.to_string()))
}

/// An entry of the assignment menu: one real assignment, or the synthetic
/// entry that stands for all of them.
#[derive(Debug, Clone, Copy)]
pub enum AssignmentChoice<'a> {
    One(&'a CourseWork),
    All,
}

impl<'a> AssignmentChoice<'a> {
    /// Every assignment in listing order, followed by the "all" entry.
    pub fn menu(works: &'a [CourseWork]) -> Vec<Self> {
        works
            .iter()
            .map(AssignmentChoice::One)
            .chain(std::iter::once(AssignmentChoice::All))
            .collect()
    }

    pub fn label(&self) -> &str {
        match self {
            AssignmentChoice::One(w) => &w.title,
            AssignmentChoice::All => ALL_COURSE_WORKS,
        }
    }

    /// The assignments to process for this choice.
    pub fn expand(&self, works: &'a [CourseWork]) -> Vec<&'a CourseWork> {
        match self {
            AssignmentChoice::One(w) => vec![*w],
            AssignmentChoice::All => works.iter().collect(),
        }
    }
}
