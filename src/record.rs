// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::io::Write;
use std::sync::Mutex;

use csv::Writer;

use crate::history::Ply;

/// One row of a game record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyRecord {
    pub index: usize,
    pub color: String,
    pub token: String,
    pub piece: String,
    pub captured: String,
    pub special: String,
}

impl PlyRecord {
    pub fn new(index: usize, ply: &Ply) -> PlyRecord {
        let primary = ply.primary;
        let mut record = PlyRecord {
            index,
            color: primary.piece.color.to_string().to_lowercase(),
            token: ply.token().to_string(),
            piece: primary.piece.kind.name().to_owned(),
            ..PlyRecord::default()
        };

        if let Some(d) = ply.secondary {
            if d.to.is_on_board() {
                record.special = "castle".to_owned();
            } else {
                record.captured = d.piece.kind.name().to_owned();
                if d.from != primary.to {
                    record.special = "en-passant".to_owned();
                }
            }
        }

        if ply.promotion.is_some() {
            record.special = "promotion".to_owned();
        }

        record
    }
}

pub trait GameRecorder {
    fn record(&self, index: usize, ply: &Ply);
}

pub struct NullGameRecorder;

impl GameRecorder for NullGameRecorder {
    fn record(&self, _index: usize, _ply: &Ply) {}
}

/// Writes one CSV row per committed ply.
pub struct CsvGameRecorder<W: Write> {
    writer: Mutex<Writer<W>>,
}

impl<W: Write> CsvGameRecorder<W> {
    pub fn new(writer: W) -> CsvGameRecorder<W> {
        CsvGameRecorder {
            writer: Mutex::new(Writer::from_writer(writer)),
        }
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Option<W> {
        let writer = self
            .writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.into_inner().ok()
    }
}

impl<W: Write> GameRecorder for CsvGameRecorder<W> {
    fn record(&self, index: usize, ply: &Ply) {
        let row = PlyRecord::new(index, ply);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writer.serialize(&row).and_then(|_| Ok(writer.flush()?)) {
            warn!("failed to record ply {}: {}", index, e);
        }
    }
}
