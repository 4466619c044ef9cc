use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::gps_processor::{ProcessResult, RawData};

pub struct RawDataFile {
    pub name: String,
    pub path: String,
}

/* This is an optional feature that should be off by default: storing raw GPS
   data with the verdict the tracker gave each sample. It is designed for
   advanced users or debugging (e.g. tuning the accuracy/jitter thresholds
   against a real recording). It stores data in a simple csv format and uses
   a new file every time it is switched on.
*/
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDataRow {
    pub timestamp_ms: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f32>,
    pub altitude: Option<f32>,
    pub speed: Option<f32>,
    pub process_result: i8,
}

impl RawDataRow {
    pub fn new(raw_data: &RawData, process_result: ProcessResult) -> Self {
        RawDataRow {
            timestamp_ms: raw_data.timestamp_ms,
            latitude: raw_data.point.latitude,
            longitude: raw_data.point.longitude,
            accuracy: raw_data.accuracy,
            altitude: raw_data.altitude,
            speed: raw_data.speed,
            process_result: process_result.to_int(),
        }
    }

    pub fn to_raw_data(&self) -> RawData {
        let mut raw_data = RawData::new(self.latitude, self.longitude);
        raw_data.timestamp_ms = self.timestamp_ms;
        raw_data.accuracy = self.accuracy;
        raw_data.altitude = self.altitude;
        raw_data.speed = self.speed;
        raw_data
    }
}

struct RawDataRecorder {
    dir: PathBuf,
    writer: Option<csv::Writer<File>>,
}

impl RawDataRecorder {
    fn init(support_dir: &str) -> Result<RawDataRecorder> {
        let dir = Path::new(support_dir).join("raw_data/");
        fs::create_dir_all(&dir)?;
        Ok(RawDataRecorder { dir, writer: None })
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn open_new_file(&self) -> Result<csv::Writer<File>> {
        let timestamp_sec = Utc::now().timestamp();
        let mut i = 0;
        let filename = loop {
            let filename = self.dir.join(format!("gps-{}-{}.csv", timestamp_sec, i));
            if fs::metadata(&filename).is_err() {
                break filename;
            }
            i += 1;
        };
        debug!("[storage] recording raw data to {:?}", filename);
        Ok(csv::Writer::from_path(filename)?)
    }

    fn record(&mut self, raw_data: &RawData, process_result: ProcessResult) -> Result<()> {
        if self.writer.is_none() {
            self.writer = Some(self.open_new_file()?);
        }
        if let Some(ref mut writer) = self.writer {
            writer.serialize(RawDataRow::new(raw_data, process_result))?;
        }
        Ok(())
    }
}

pub fn read_raw_data_file(path: &str) -> Result<Vec<RawDataRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

pub struct Storage {
    support_dir: String,
    raw_data_recorder: Mutex<Option<RawDataRecorder>>, // `None` means disabled
}

impl Storage {
    pub fn init(support_dir: String, raw_data_mode: bool) -> Result<Self> {
        let raw_data_recorder = if raw_data_mode {
            Some(RawDataRecorder::init(&support_dir)?)
        } else {
            None
        };
        Ok(Storage {
            support_dir,
            raw_data_recorder: Mutex::new(raw_data_recorder),
        })
    }

    pub fn toggle_raw_data_mode(&self, enable: bool) -> Result<()> {
        let mut raw_data_recorder = self.raw_data_recorder.lock().unwrap();
        if enable {
            if raw_data_recorder.is_none() {
                *raw_data_recorder = Some(RawDataRecorder::init(&self.support_dir)?);
                debug!("[storage] raw data mode enabled");
            }
        } else if let Some(mut recorder) = raw_data_recorder.take() {
            debug!("[storage] raw data mode disabled");
            recorder.flush()?;
        }
        Ok(())
    }

    pub fn get_raw_data_mode(&self) -> bool {
        let raw_data_recorder = self.raw_data_recorder.lock().unwrap();
        raw_data_recorder.is_some()
    }

    pub fn record_gps_data(&self, raw_data: &RawData, process_result: ProcessResult) {
        let mut raw_data_recorder = self.raw_data_recorder.lock().unwrap();
        if let Some(ref mut recorder) = *raw_data_recorder {
            // best-effort, losing debug data must not break tracking
            if let Err(e) = recorder.record(raw_data, process_result) {
                warn!("[storage] failed to record raw data: {:?}", e);
            }
        }
    }

    pub fn list_all_raw_data(&self) -> Result<Vec<RawDataFile>> {
        let dir = Path::new(&self.support_dir).join("raw_data/");
        let mut result = Vec::new();
        if !dir.exists() {
            return Ok(result);
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let (Some(name), Some(path_str)) =
                (path.file_name().and_then(|x| x.to_str()), path.to_str())
            else {
                continue;
            };
            if name.ends_with(".csv") {
                result.push(RawDataFile {
                    name: name.to_string(),
                    path: path_str.to_string(),
                })
            }
        }
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    pub fn flush(&self) -> Result<()> {
        debug!("[storage] flushing");
        let mut raw_data_recorder = self.raw_data_recorder.lock().unwrap();
        if let Some(ref mut recorder) = *raw_data_recorder {
            recorder.flush()?;
        }
        Ok(())
    }
}
