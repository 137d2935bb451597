// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! ONNX CRNN text recognition engine
//!
//! Single-line regions go straight through the model; block regions are
//! segmented into rows first and recognized row by row. Runs on CPU only.

use anyhow::{Context, Result};
use image::GrayImage;
use ndarray::IxDyn;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::{line_tensor, segment_rows};
use super::{OcrError, RecognitionMode, TextRecognizer};

/// CRNN recognition model with a CTC-decoded character dictionary.
pub struct OnnxRecognizer {
    session: Arc<Mutex<Session>>,
    dictionary: Arc<Vec<char>>,
    input_name: String,
}

impl std::fmt::Debug for OnnxRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxRecognizer")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OnnxRecognizer {
    /// Load the recognition model and its character dictionary.
    pub fn new<P: AsRef<Path>>(model_path: P, dict_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            anyhow::bail!("character dictionary not found: {}", dict_path.display());
        }

        let dictionary = Self::load_dictionary(dict_path)?;
        info!(
            "loaded character dictionary with {} characters",
            dictionary.len()
        );

        let session = Session::builder()
            .context("failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("failed to set optimization level")?
            .with_intra_threads(4)
            .context("failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "failed to load recognition model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        info!("recognition model loaded (CPU-only), input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dictionary: Arc::new(dictionary),
            input_name,
        })
    }

    /// One character per line; index 0 is the CTC blank token.
    fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Vec<char>> {
        let file = File::open(path.as_ref()).context(format!(
            "failed to open dictionary: {}",
            path.as_ref().display()
        ))?;

        let reader = BufReader::new(file);
        let mut dictionary = vec![' '];
        for line in reader.lines() {
            let line = line.context("failed to read dictionary line")?;
            if let Some(ch) = line.chars().next() {
                dictionary.push(ch);
            }
        }
        if !dictionary.contains(&' ') {
            dictionary.push(' ');
        }
        Ok(dictionary)
    }

    fn recognize_line(&self, region: &GrayImage) -> Result<String> {
        let tensor = line_tensor(region);

        let mut session = self.session.lock().unwrap();
        let input_value =
            Value::from_array(tensor).context("failed to create input tensor")?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("recognition inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("failed to extract output tensor")?;

        let text = self.ctc_decode(&output_tensor)?;
        debug!(len = text.len(), "recognized line");
        Ok(text)
    }

    /// Greedy best-path CTC decoding with blank removal and repeat
    /// collapsing.
    fn ctc_decode(
        &self,
        output: &ndarray::ArrayBase<ndarray::ViewRepr<&f32>, ndarray::Dim<ndarray::IxDynImpl>>,
    ) -> Result<String> {
        let shape = output.shape();
        let (seq_len, num_classes) = if shape.len() == 3 {
            (shape[1], shape[2])
        } else if shape.len() == 2 {
            (shape[0], shape[1])
        } else {
            anyhow::bail!("unexpected output shape: {:?}", shape);
        };

        let mut text = String::new();
        let mut prev_index: Option<usize> = None;

        for t in 0..seq_len {
            let mut max_prob = f32::NEG_INFINITY;
            let mut max_index = 0usize;
            for c in 0..num_classes {
                let prob = if shape.len() == 3 {
                    output[IxDyn(&[0, t, c])]
                } else {
                    output[IxDyn(&[t, c])]
                };
                if prob > max_prob {
                    max_prob = prob;
                    max_index = c;
                }
            }

            if max_index != 0 && Some(max_index) != prev_index {
                if max_index < self.dictionary.len() {
                    text.push(self.dictionary[max_index]);
                }
            }
            prev_index = if max_index == 0 { None } else { Some(max_index) };
        }

        Ok(text)
    }
}

impl TextRecognizer for OnnxRecognizer {
    fn name(&self) -> &'static str {
        "onnx-crnn"
    }

    fn recognize(&self, region: &GrayImage, mode: RecognitionMode) -> Result<String, OcrError> {
        match mode {
            RecognitionMode::SingleLine => self
                .recognize_line(region)
                .map_err(|e| OcrError::Inference(e.to_string())),
            RecognitionMode::Block => {
                let rows = segment_rows(region);
                if rows.is_empty() {
                    return Ok(String::new());
                }
                let mut lines = Vec::with_capacity(rows.len());
                for row in &rows {
                    let line = self
                        .recognize_line(row)
                        .map_err(|e| OcrError::Inference(e.to_string()))?;
                    if !line.trim().is_empty() {
                        lines.push(line);
                    }
                }
                Ok(lines.join("\n"))
            }
        }
    }
}
