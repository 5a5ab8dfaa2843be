use std::io::{BufReader, Stdin, Stdout};

use crate::stream::StreamChannel;

/// Channel over the process's standard input and output.
///
/// Holds the unlocked handles, so the channel is `Send` and can sit behind a
/// lock shared by several threads. Each read or write takes the std lock for
/// that call only.
pub type StdioChannel = StreamChannel<BufReader<Stdin>, Stdout>;

/// Channel over stdin and stdout.
///
/// Anything else printed to stdout while the channel is alive would corrupt
/// the message stream, so diagnostics should go to stderr.
pub fn stdio() -> StdioChannel {
    StreamChannel::new(BufReader::new(std::io::stdin()), std::io::stdout())
}
