// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command as Process, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, Builder};
use std::time::{Duration, Instant};

use super::{EngineError, EngineSettings};
use crate::uci::{self, BestMove, Command, ToUciWire};

const CHUNK_SIZE: usize = 4096;
const EXIT_POLL: Duration = Duration::from_millis(10);

type Chunk = io::Result<Vec<u8>>;

/// Where the client is in its conversation with the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClientState {
    Uninitialized,
    Ready,
    Sending,
    AwaitingReply,
    Terminated,
}

/// Client for an engine speaking UCI over a pair of byte streams, normally
/// the stdin and stdout of a child process.
///
/// A background thread reads the engine's output in chunks and forwards them
/// over a channel; `response_move` polls that channel, so only the thread
/// waiting for a reply ever blocks.
///
/// Any failure while sending or waiting for a reply leaves the client
/// `Terminated`. Dropping the client shuts the engine down.
pub struct EngineClient {
    state: ClientState,
    settings: EngineSettings,
    writer: Option<Box<dyn Write + Send>>,
    output: Receiver<Chunk>,
    pending: Vec<u8>,
    child: Option<Child>,
}

impl EngineClient {
    /// Starts the engine program and sends the opening handshake.
    pub fn spawn(settings: &EngineSettings) -> Result<EngineClient, EngineError> {
        info!(
            "starting engine {} {:?}",
            settings.program.display(),
            settings.args
        );

        let mut child = Process::new(&settings.program)
            .args(&settings.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(EngineError::Spawn)?;

        let streams = (child.stdin.take(), child.stdout.take());
        let (stdin, stdout): (ChildStdin, ChildStdout) = match streams {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            (stdin, _) => {
                let _ = child.kill();
                let _ = child.wait();
                let missing = if stdin.is_none() { "stdin" } else { "stdout" };
                return Err(EngineError::PipeUnavailable(missing));
            }
        };

        let mut client = EngineClient::connect(stdout, stdin, settings.clone());
        client.child = Some(child);
        client.handshake()?;
        Ok(client)
    }

    /// Talks to an engine over arbitrary streams, sending the opening
    /// handshake. `reader` carries the engine's output and `writer` its
    /// input.
    pub fn from_streams<R, W>(
        reader: R,
        writer: W,
        settings: EngineSettings,
    ) -> Result<EngineClient, EngineError>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let mut client = EngineClient::connect(reader, writer, settings);
        client.handshake()?;
        Ok(client)
    }

    fn connect<R, W>(reader: R, writer: W, settings: EngineSettings) -> EngineClient
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let spawned = Builder::new()
            .name("engine-reader".to_owned())
            .spawn(move || pump(reader, tx));

        if let Err(e) = spawned {
            // The receiver sees a disconnected channel, which surfaces as
            // `EngineError::Disconnected` on the first reply.
            error!("failed to start engine reader thread: {}", e);
        }

        EngineClient {
            state: ClientState::Uninitialized,
            settings,
            writer: Some(Box::new(writer)),
            output: rx,
            pending: Vec::new(),
            child: None,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        self.send(&Command::Uci)?;
        self.send(&Command::IsReady)?;
        self.transition(ClientState::Ready);
        Ok(())
    }

    /// Sends the position reached by `moves` from the starting position and
    /// starts a search on it.
    pub fn send_position(&mut self, moves: &[String]) -> Result<(), EngineError> {
        if self.state != ClientState::Ready {
            return Err(EngineError::NotReady(self.state));
        }

        self.transition(ClientState::Sending);
        match self.request(moves) {
            Ok(()) => {
                self.transition(ClientState::AwaitingReply);
                Ok(())
            }
            Err(e) => {
                warn!("failed to send position to engine: {}", e);
                self.transition(ClientState::Terminated);
                Err(e)
            }
        }
    }

    fn request(&mut self, moves: &[String]) -> Result<(), EngineError> {
        self.discard_output()?;
        self.send(&Command::Position {
            moves: moves.to_vec(),
        })?;

        let depth = self.settings.search_depth;
        self.send(&Command::Go { depth })
    }

    /// Waits for the engine's `bestmove` reply to the last search.
    pub fn response_move(&mut self) -> Result<BestMove, EngineError> {
        if self.state != ClientState::AwaitingReply {
            return Err(EngineError::NotReady(self.state));
        }

        match self.await_best_move() {
            Ok(best) => {
                info!("engine replied {:?}", best);
                self.transition(ClientState::Ready);
                Ok(best)
            }
            Err(e) => {
                warn!("engine reply failed: {}", e);
                self.transition(ClientState::Terminated);
                Err(e)
            }
        }
    }

    fn await_best_move(&mut self) -> Result<BestMove, EngineError> {
        let timeout = self.settings.reply_timeout;
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if let Some(best) = self.scan_lines() {
                return Ok(best);
            }

            match self.output.recv_timeout(self.settings.poll_interval) {
                Ok(Ok(chunk)) => self.pending.extend_from_slice(&chunk),
                Ok(Err(e)) => return Err(EngineError::Read(e)),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    // The last line may not end in a newline.
                    self.pending.push(b'\n');
                    return self.scan_lines().ok_or(EngineError::Disconnected);
                }
            }

            if let (Some(deadline), Some(timeout)) = (deadline, timeout) {
                if Instant::now() >= deadline {
                    return Err(EngineError::Timeout(timeout));
                }
            }
        }
    }

    /// Consumes complete lines from the pending output up to and including
    /// the first `bestmove` line.
    fn scan_lines(&mut self) -> Option<BestMove> {
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end();
            trace!("engine < {}", line);
            if let Some(best) = uci::parse_best_move(line) {
                return Some(best);
            }
        }

        None
    }

    /// Drops output left over from earlier commands so that a stale
    /// `bestmove` cannot answer a new search.
    fn discard_output(&mut self) -> Result<(), EngineError> {
        loop {
            match self.output.try_recv() {
                Ok(Ok(chunk)) => {
                    trace!("discarding {} bytes of engine output", chunk.len());
                }
                Ok(Err(e)) => return Err(EngineError::Read(e)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        self.pending.clear();
        Ok(())
    }

    fn send(&mut self, command: &Command) -> Result<(), EngineError> {
        let writer = match self.writer.as_mut() {
            Some(writer) => writer,
            None => return Err(EngineError::NotReady(self.state)),
        };

        debug!("engine > {:?}", command);
        command
            .to_uci_wire(writer)
            .and_then(|_| writer.flush())
            .map_err(EngineError::Write)
    }

    fn transition(&mut self, next: ClientState) {
        debug!("engine client: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Asks the engine to quit and waits up to the configured grace period
    /// for it to exit, killing it otherwise. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let quit = Command::Quit
                .to_uci_wire(&mut writer)
                .and_then(|_| writer.flush());
            if let Err(e) = quit {
                debug!("could not send quit to engine: {}", e);
            }
            // dropping the writer closes the engine's stdin
        }

        if let Some(mut child) = self.child.take() {
            reap(&mut child, self.settings.shutdown_grace);
        }

        if self.state != ClientState::Terminated {
            self.transition(ClientState::Terminated);
        }
    }
}

impl Drop for EngineClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn reap(child: &mut Child, grace: Duration) {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                info!("engine exited: {}", status);
                return;
            }
            Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL),
            Ok(None) => break,
            Err(e) => {
                warn!("failed to poll engine exit status: {}", e);
                break;
            }
        }
    }

    warn!("engine did not exit within {} ms, killing it", grace.as_millis());
    if let Err(e) = child.kill() {
        warn!("failed to kill engine: {}", e);
    }

    let _ = child.wait();
}

/// Forwards raw output chunks until end of stream, a read error, or the
/// client going away.
fn pump<R: Read>(mut reader: R, tx: Sender<Chunk>) {
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!("engine output closed");
                return;
            }
            Ok(n) => {
                if tx.send(Ok(buf[..n].to_vec())).is_err() {
                    return;
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read, Write};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::{ClientState, EngineClient};
    use crate::engine::{EngineError, EngineSettings};
    use crate::uci::BestMove;

    /// The engine's stdout: whatever the stub sends, until it hangs up.
    struct StubOutput(Receiver<Vec<u8>>);

    impl Read for StubOutput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.recv() {
                Ok(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Err(_) => Ok(0),
            }
        }
    }

    /// The engine's stdin: records every command and answers `go` with the
    /// scripted chunks.
    #[derive(Clone)]
    struct StubInput {
        written: Arc<Mutex<Vec<u8>>>,
        output: Sender<Vec<u8>>,
        reply: Vec<&'static str>,
    }

    impl StubInput {
        fn text(&self) -> String {
            String::from_utf8(self.written.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for StubInput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.lock().unwrap().extend_from_slice(buf);
            if buf.starts_with(b"go depth") {
                for chunk in &self.reply {
                    let _ = self.output.send(chunk.as_bytes().to_vec());
                }
            }

            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn settings() -> EngineSettings {
        EngineSettings {
            poll_interval: Duration::from_millis(5),
            reply_timeout: Some(Duration::from_millis(200)),
            ..EngineSettings::default()
        }
    }

    fn stub(reply: Vec<&'static str>) -> (EngineClient, StubInput, Sender<Vec<u8>>) {
        let (tx, rx) = mpsc::channel();
        let input = StubInput {
            written: Arc::new(Mutex::new(Vec::new())),
            output: tx.clone(),
            reply,
        };

        let client = EngineClient::from_streams(StubOutput(rx), input.clone(), settings()).unwrap();
        (client, input, tx)
    }

    #[test]
    fn handshake_is_sent_on_connect() {
        let (client, input, _hold) = stub(vec![]);
        assert_eq!(ClientState::Ready, client.state());
        assert_eq!("uci\nisready\n", input.text());
    }

    #[test]
    fn round_trip_with_split_reply() {
        let (mut client, input, _hold) = stub(vec!["info depth 1 pv e7e5\nbestmo", "ve e7e5 ponder g1f3\n"]);
        let moves = vec!["e2e4".to_owned(), "d2d4".to_owned()];
        client.send_position(&moves).unwrap();
        assert_eq!(ClientState::AwaitingReply, client.state());
        assert_eq!(
            BestMove::Move("e7e5".to_owned()),
            client.response_move().unwrap()
        );
        assert_eq!(ClientState::Ready, client.state());
        assert_eq!(
            "uci\nisready\nposition startpos moves e2e4 d2d4\ngo depth 10\n",
            input.text()
        );
    }

    #[test]
    fn no_move_reply() {
        let (mut client, _input, _hold) = stub(vec!["bestmove (none)\n"]);
        client.send_position(&[]).unwrap();
        assert_eq!(BestMove::None, client.response_move().unwrap());
    }

    #[test]
    fn operations_out_of_order_are_refused() {
        let (mut client, _input, _hold) = stub(vec![]);
        match client.response_move() {
            Err(EngineError::NotReady(ClientState::Ready)) => {}
            other => panic!("unexpected {:?}", other),
        }

        client.send_position(&[]).unwrap();
        match client.send_position(&[]) {
            Err(EngineError::NotReady(ClientState::AwaitingReply)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn silent_engine_times_out() {
        let (mut client, _input, _hold) = stub(vec!["info depth 1\n"]);
        client.send_position(&[]).unwrap();
        match client.response_move() {
            Err(EngineError::Timeout(after)) => assert_eq!(Duration::from_millis(200), after),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(ClientState::Terminated, client.state());
    }

    #[test]
    fn hang_up_is_disconnect() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let input = StubInput {
            written: Arc::new(Mutex::new(Vec::new())),
            output: mpsc::channel().0,
            reply: vec![],
        };
        let mut client = EngineClient::from_streams(StubOutput(rx), input, settings()).unwrap();
        tx.send(b"uciok\n".to_vec()).unwrap();
        drop(tx);

        client.send_position(&[]).unwrap();
        match client.response_move() {
            Err(EngineError::Disconnected) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn shutdown_sends_quit_once() {
        let (mut client, input, _hold) = stub(vec![]);
        client.shutdown();
        client.shutdown();
        assert_eq!(ClientState::Terminated, client.state());
        assert_eq!("uci\nisready\nquit\n", input.text());
    }
}
