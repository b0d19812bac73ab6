//! JR-100 サウンドエミュレーション（ブザー）
//!
//! VIA タイマ1 が生成する矩形波を合成する。周波数は
//! クロック / (2 × (ラッチ + 2))。PB7 出力モードが無効になると無音。
//! 環境変数 JR100_DEBUG=audio で詳細ログを出す。

use std::collections::VecDeque;

use crate::via::ToneEvent;

/// サンプルレート (Hz)
pub const SAMPLE_RATE: u32 = 44_100;

/// 1フレームあたりのサンプル数 (44100 / 60)
pub const SAMPLES_PER_FRAME: usize = 735;

/// リングバッファ上限（約0.2秒分）
#[cfg(feature = "audio")]
const RING_BUFFER_LIMIT: usize = 8192;

/// 1-pole IIR ローパスフィルタ（矩形波の角を少し丸める）
struct LowPass {
    alpha: f32,
    z: f32,
}

impl LowPass {
    fn new(cutoff_hz: f32, sample_rate: f32) -> Self {
        let rc = 1.0 / (2.0 * std::f32::consts::PI * cutoff_hz);
        let dt = 1.0 / sample_rate;
        LowPass {
            alpha: dt / (rc + dt),
            z: 0.0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        self.z += self.alpha * (input - self.z);
        self.z
    }
}

/// ブザー音源。VIA からのトーンイベントを消費して矩形波を合成する
pub struct Beeper {
    events: VecDeque<ToneEvent>,
    line_on: bool,
    frequency: f32,
    phase: f32,
    volume: f32,
    enabled: bool,
    sample_buffer: Vec<f32>,
    lpf: LowPass,
    debug: bool,
}

impl Default for Beeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Beeper {
    pub fn new() -> Self {
        let debug = std::env::var("JR100_DEBUG")
            .map(|v| v == "audio")
            .unwrap_or(false);
        Beeper {
            events: VecDeque::with_capacity(64),
            line_on: false,
            frequency: 0.0,
            phase: 0.0,
            volume: 0.25,
            enabled: true,
            sample_buffer: vec![0.0; SAMPLES_PER_FRAME],
            lpf: LowPass::new(6000.0, SAMPLE_RATE as f32),
            debug,
        }
    }

    /// VIA から取り出したトーンイベントを受け取る
    pub fn push_events(&mut self, events: Vec<ToneEvent>) {
        for event in events {
            if self.debug {
                log::debug!(
                    "beeper: event cycle={} enabled={} freq={:.1}",
                    event.cycle,
                    event.enabled,
                    event.frequency
                );
            }
            self.events.push_back(event);
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[allow(dead_code)]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// 現在発音中か
    pub fn is_sounding(&self) -> bool {
        self.line_on && self.frequency > 0.0
    }

    pub fn reset(&mut self) {
        self.events.clear();
        self.line_on = false;
        self.frequency = 0.0;
        self.phase = 0.0;
        self.lpf.z = 0.0;
    }

    fn apply_event(&mut self, event: ToneEvent) {
        self.line_on = event.enabled;
        if event.enabled {
            self.frequency = event.frequency;
        }
        if self.debug {
            log::debug!(
                "beeper: line={} freq={:.1}",
                self.line_on,
                self.frequency
            );
        }
    }

    /// 1フレームぶんのサンプルを合成する。無音フレームは None
    pub fn generate_samples(
        &mut self,
        base_cycle: u64,
        cycles_per_frame: u64,
    ) -> Option<&[f32]> {
        let end_cycle = base_cycle + cycles_per_frame;

        if !self.enabled || cycles_per_frame == 0 {
            // 出力しない場合もイベントの状態だけは反映しておく
            while let Some(&event) = self.events.front() {
                if event.cycle >= end_cycle {
                    break;
                }
                self.events.pop_front();
                self.apply_event(event);
            }
            return None;
        }

        let had_events = self
            .events
            .front()
            .map(|e| e.cycle < end_cycle)
            .unwrap_or(false);
        if !self.is_sounding() && !had_events {
            self.phase = 0.0;
            return None;
        }

        let cycles_per_sample = cycles_per_frame as f32 / SAMPLES_PER_FRAME as f32;
        for i in 0..SAMPLES_PER_FRAME {
            let sample_cycle = base_cycle + (i as f32 * cycles_per_sample) as u64;

            // このサンプル時点までのイベントを反映
            while let Some(&event) = self.events.front() {
                if event.cycle > sample_cycle {
                    break;
                }
                self.events.pop_front();
                self.apply_event(event);
            }

            let raw = if self.is_sounding() {
                self.phase += self.frequency / SAMPLE_RATE as f32;
                if self.phase >= 1.0 {
                    self.phase -= 1.0;
                }
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            } else {
                0.0
            };

            self.sample_buffer[i] = self.lpf.process(raw) * self.volume;
        }

        // フレーム終端までの残イベントを消費
        while let Some(&event) = self.events.front() {
            if event.cycle >= end_cycle {
                break;
            }
            self.events.pop_front();
            self.apply_event(event);
        }

        Some(&self.sample_buffer)
    }
}

// ============================================================
// オーディオ出力（rodio が有効な場合のみ）
// ============================================================

#[cfg(feature = "audio")]
mod output {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use rodio::{OutputStream, Sink, Source};

    use super::{RING_BUFFER_LIMIT, SAMPLE_RATE};

    /// rodio へ流し込む共有バッファ
    struct SharedBuffer {
        samples: Mutex<VecDeque<f32>>,
    }

    pub struct AudioOutput {
        _stream: OutputStream,
        _sink: Sink,
        buffer: Arc<SharedBuffer>,
    }

    impl AudioOutput {
        /// 既定の出力デバイスを開く。失敗はエラー文字列で返す（無音継続用）
        pub fn new() -> Result<Self, String> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| format!("failed to open audio output: {e}"))?;
            let sink =
                Sink::try_new(&handle).map_err(|e| format!("failed to create sink: {e}"))?;

            let buffer = Arc::new(SharedBuffer {
                samples: Mutex::new(VecDeque::with_capacity(RING_BUFFER_LIMIT)),
            });
            sink.append(BufferSource {
                buffer: Arc::clone(&buffer),
                last: 0.0,
            });

            Ok(AudioOutput {
                _stream: stream,
                _sink: sink,
                buffer,
            })
        }

        /// 合成済みフレームを出力キューへ積む
        pub fn play_samples(&mut self, samples: Option<&[f32]>) {
            let Some(samples) = samples else { return };
            let mut queue = match self.buffer.samples.lock() {
                Ok(queue) => queue,
                Err(_) => return,
            };
            if queue.len() + samples.len() > RING_BUFFER_LIMIT {
                return; // 溢れたフレームは捨てる
            }
            queue.extend(samples.iter().copied());
        }
    }

    struct BufferSource {
        buffer: Arc<SharedBuffer>,
        last: f32,
    }

    impl Iterator for BufferSource {
        type Item = f32;

        fn next(&mut self) -> Option<f32> {
            let sample = self
                .buffer
                .samples
                .lock()
                .ok()
                .and_then(|mut queue| queue.pop_front());
            match sample {
                Some(s) => {
                    self.last = s;
                    Some(s)
                }
                None => {
                    // アンダーラン時は直前値を減衰させてクリックを避ける
                    self.last *= 0.95;
                    Some(self.last)
                }
            }
        }
    }

    impl Source for BufferSource {
        fn current_frame_len(&self) -> Option<usize> {
            None
        }
        fn channels(&self) -> u16 {
            1
        }
        fn sample_rate(&self) -> u32 {
            SAMPLE_RATE
        }
        fn total_duration(&self) -> Option<std::time::Duration> {
            None
        }
    }
}

#[cfg(feature = "audio")]
pub use output::AudioOutput;

// ============================================================
// スタブ実装（rodio が無効な場合）
// ============================================================

#[cfg(not(feature = "audio"))]
pub struct AudioOutput;

#[cfg(not(feature = "audio"))]
impl AudioOutput {
    pub fn new() -> Result<Self, String> {
        Ok(AudioOutput)
    }
    pub fn play_samples(&mut self, _samples: Option<&[f32]>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(cycle: u64, enabled: bool, frequency: f32) -> ToneEvent {
        ToneEvent {
            cycle,
            enabled,
            frequency,
        }
    }

    #[test]
    fn silent_when_no_events() {
        let mut beeper = Beeper::new();
        assert!(beeper.generate_samples(0, 14_915).is_none());
    }

    #[test]
    fn square_wave_alternates_sign() {
        let mut beeper = Beeper::new();
        beeper.push_events(vec![tone(0, true, 1000.0)]);
        let samples = beeper.generate_samples(0, 14_915).expect("samples");
        assert_eq!(samples.len(), SAMPLES_PER_FRAME);
        let positive = samples.iter().filter(|&&s| s > 0.0).count();
        let negative = samples.iter().filter(|&&s| s < 0.0).count();
        // 1kHz ならフレーム内で両極がほぼ同数現れる
        assert!(positive > 200, "positive={positive}");
        assert!(negative > 200, "negative={negative}");
    }

    #[test]
    fn disable_event_silences_mid_frame() {
        let mut beeper = Beeper::new();
        beeper.push_events(vec![tone(0, true, 2000.0), tone(7_000, false, 0.0)]);
        let samples = beeper.generate_samples(0, 14_000).expect("samples");
        // 後半は LPF の残響を除けば無音に向かう
        let tail = &samples[SAMPLES_PER_FRAME - 16..];
        assert!(tail.iter().all(|s| s.abs() < 0.05), "tail={tail:?}");
        assert!(!beeper.is_sounding());
    }

    #[test]
    fn events_apply_even_when_disabled() {
        let mut beeper = Beeper::new();
        beeper.set_enabled(false);
        beeper.push_events(vec![tone(10, true, 440.0)]);
        assert!(beeper.generate_samples(0, 14_915).is_none());
        // 状態は追従している
        assert!(beeper.is_sounding());
    }

    #[test]
    fn reset_clears_pending_state() {
        let mut beeper = Beeper::new();
        beeper.push_events(vec![tone(0, true, 440.0)]);
        beeper.generate_samples(0, 14_915);
        beeper.reset();
        assert!(!beeper.is_sounding());
        assert!(beeper.generate_samples(14_915, 14_915).is_none());
    }
}
