//! JR100RS - JR-100 Emulator Library
//!
//! 1981年の松下 JR-100（MB8861 CPU + R6522 VIA + 32×24 キャラクタ表示）の
//! エミュレーションコアを提供する。
//!
//! CPU・メモリ・VIA・キーボード・ビデオ・サウンド・ローダの各モジュールと、
//! それらを結線した `jr100::Machine` からなる。

pub mod config;
pub mod cpu;
pub mod jr100;
pub mod keyboard;
pub mod loader;
pub mod memory;
pub mod sound;
pub mod via;
pub mod video;
