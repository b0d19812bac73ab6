//! JR100RS - JR-100 Emulator in Rust
//!
//! 松下 JR-100 のエミュレータ。
//!
//! # 使用方法
//! ```text
//! jr100rs --rom jr100rom.bin --program starfire.prg --scale 2
//! ```
//!
//! BASIC ROM（8KB）が必須。PROG ファイルはリセット後にロードされる。
//! 環境変数 JR100_DEBUG=audio でオーディオの詳細ログを有効化。

use jr100rs::config::Config;
use jr100rs::cpu::CpuError;
use jr100rs::jr100::{Machine, MachineConfig, CYCLES_PER_FRAME};
use jr100rs::loader;
use jr100rs::sound::AudioOutput;
use jr100rs::video::{SCREEN_HEIGHT, SCREEN_WIDTH};

use clap::Parser;
use minifb::{Key, Window, WindowOptions};
use std::fs;

/// JR100RS - JR-100 Emulator in Rust
#[derive(Parser, Debug)]
#[command(name = "jr100rs")]
#[command(version = "0.1.0")]
#[command(about = "JR100RS - JR-100 Emulator in Rust", long_about = None)]
struct Args {
    /// BASIC ROM ファイル（8192 バイト、必須）
    #[arg(long)]
    rom: String,

    /// リセット後にロードする PROG ファイル
    #[arg(long)]
    program: Option<String>,

    /// ウィンドウ拡大率
    #[arg(long)]
    scale: Option<usize>,

    /// フルスクリーン風表示（ボーダーレスウィンドウ）
    #[arg(long)]
    fullscreen: bool,

    /// ヘッドレスモード（ウィンドウなしで実行）
    #[arg(long)]
    headless: bool,

    /// ヘッドレスモードで実行するサイクル数
    #[arg(long, default_value = "10000000")]
    cycles: u64,

    /// 拡張RAM（32KB）を有効化
    #[arg(long)]
    extended_ram: bool,

    /// サウンドを無効化
    #[arg(long)]
    no_sound: bool,
}

/// ホストキーから JR-100 キーマトリクス（行, 列）への対応。
/// 配列は実機のマトリクス配線どおり
const KEY_MAP: &[(Key, usize, usize)] = &[
    (Key::LeftCtrl, 0, 0),
    (Key::RightCtrl, 0, 0),
    (Key::LeftShift, 0, 1),
    (Key::RightShift, 0, 1),
    (Key::Z, 0, 2),
    (Key::X, 0, 3),
    (Key::C, 0, 4),
    (Key::A, 1, 0),
    (Key::S, 1, 1),
    (Key::D, 1, 2),
    (Key::F, 1, 3),
    (Key::G, 1, 4),
    (Key::Q, 2, 0),
    (Key::W, 2, 1),
    (Key::E, 2, 2),
    (Key::R, 2, 3),
    (Key::T, 2, 4),
    (Key::Key1, 3, 0),
    (Key::Key2, 3, 1),
    (Key::Key3, 3, 2),
    (Key::Key4, 3, 3),
    (Key::Key5, 3, 4),
    (Key::Key6, 4, 0),
    (Key::Key7, 4, 1),
    (Key::Key8, 4, 2),
    (Key::Key9, 4, 3),
    (Key::Key0, 4, 4),
    (Key::Y, 5, 0),
    (Key::U, 5, 1),
    (Key::I, 5, 2),
    (Key::O, 5, 3),
    (Key::P, 5, 4),
    (Key::H, 6, 0),
    (Key::J, 6, 1),
    (Key::K, 6, 2),
    (Key::L, 6, 3),
    (Key::Semicolon, 6, 4),
    (Key::V, 7, 0),
    (Key::B, 7, 1),
    (Key::N, 7, 2),
    (Key::M, 7, 3),
    (Key::Comma, 7, 4),
    (Key::Period, 8, 0),
    (Key::Space, 8, 1),
    (Key::Apostrophe, 8, 2), // コロンキー
    (Key::Enter, 8, 3),
    (Key::Minus, 8, 4),
];

/// スクリーンショットを PNG で保存
fn save_screenshot(
    filename: &str,
    fb: &[u32],
    width: usize,
    height: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = fs::File::create(filename)?;
    let writer = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut rgb = Vec::with_capacity(width * height * 3);
    for pixel in fb {
        rgb.push((pixel >> 16) as u8);
        rgb.push((pixel >> 8) as u8);
        rgb.push(*pixel as u8);
    }
    writer.write_image_data(&rgb)?;
    Ok(())
}

/// 整数倍のニアレストネイバースケーリング
fn scale_buffer(src: &[u32], dst: &mut [u32], scale: usize) {
    if scale == 1 {
        dst.copy_from_slice(src);
        return;
    }
    let dst_width = SCREEN_WIDTH * scale;
    for y in 0..SCREEN_HEIGHT {
        let src_row = y * SCREEN_WIDTH;
        for x in 0..SCREEN_WIDTH {
            let pixel = src[src_row + x];
            let base = (y * scale) * dst_width + x * scale;
            for dy in 0..scale {
                let row = base + dy * dst_width;
                dst[row..row + scale].fill(pixel);
            }
        }
    }
}

/// ヘッドレス実行。終了時にレジスタダンプを出す
fn run_headless(machine: &mut Machine, cycles: u64) -> i32 {
    match machine.run_for(cycles) {
        Ok(overshoot) => {
            let regs = &machine.cpu.regs;
            println!(
                "A={:02X} B={:02X} IX={:04X} SP={:04X} PC={:04X} CC={:02X}",
                regs.a, regs.b, regs.ix, regs.sp, regs.pc, regs.cc
            );
            println!(
                "cycles={} (+{} overshoot)",
                machine.total_cycles, overshoot
            );
            0
        }
        Err(CpuError::IllegalOpcode { pc, opcode }) => {
            eprintln!("emulation stopped: illegal opcode ${opcode:02X} at ${pc:04X}");
            1
        }
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::load();
    let scale = args.scale.unwrap_or(config.scale).max(1);
    let sound_enabled = config.sound_enabled && !args.no_sound;

    // ROM は必須。読めなければ診断を出して終了コード2
    let rom_data = match fs::read(&args.rom) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read ROM {}: {e}", args.rom);
            std::process::exit(2);
        }
    };

    let mut machine = Machine::new(MachineConfig {
        extended_ram: args.extended_ram || config.extended_ram,
    });
    if let Err(e) = machine.load_rom(&rom_data) {
        eprintln!("Failed to load ROM {}: {e}", args.rom);
        std::process::exit(2);
    }
    machine.reset();

    // PROG ファイルはリセット後にメインRAM へ適用する
    if let Some(ref path) = args.program {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Failed to read program {path}: {e}");
                std::process::exit(1);
            }
        };
        if !loader::looks_like_prog(&data) {
            eprintln!("{path} is not a PROG file");
            std::process::exit(1);
        }
        match loader::parse_prog(&data) {
            Ok(image) => {
                machine.load_program(&image);
                println!("Loaded program: {}", image.name);
            }
            Err(e) => {
                eprintln!("Failed to parse {path}: {e}");
                std::process::exit(1);
            }
        }
    }

    println!("JR100RS - JR-100 Emulator v0.1");

    if args.headless {
        let code = run_headless(&mut machine, args.cycles);
        std::process::exit(code);
    }

    let window_width = SCREEN_WIDTH * scale;
    let window_height = SCREEN_HEIGHT * scale;
    let mut window = match Window::new(
        "JR100RS",
        window_width,
        window_height,
        WindowOptions {
            borderless: args.fullscreen,
            ..WindowOptions::default()
        },
    ) {
        Ok(window) => window,
        Err(e) => {
            eprintln!("Failed to create window: {e}");
            std::process::exit(1);
        }
    };
    window.set_target_fps(60);

    // オーディオ初期化失敗は致命的ではない（無音で継続）
    let mut audio = if sound_enabled {
        match AudioOutput::new() {
            Ok(output) => Some(output),
            Err(e) => {
                log::warn!("Audio unavailable, running silent: {e}");
                None
            }
        }
    } else {
        machine.beeper.set_enabled(false);
        None
    };

    let mut scaled_buffer = vec![0u32; window_width * window_height];
    let mut carry: u64 = 0;
    let mut screenshot_index = 0u32;
    let mut f12_was_down = false;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        // キー状態をマトリクスへ反映
        for &(key, row, column) in KEY_MAP {
            machine.mem.via.set_key(row, column, window.is_key_down(key));
        }

        // 1フレームぶん実行。超過分は次フレームの予算から引く
        let budget = CYCLES_PER_FRAME.saturating_sub(carry);
        let frame_base = machine.mem.via.clock();
        match machine.run_for(budget) {
            Ok(overshoot) => carry = overshoot,
            Err(e) => {
                eprintln!("emulation stopped: {e}");
                break;
            }
        }
        let frame_cycles = machine.mem.via.clock() - frame_base;

        // オーディオ
        if let Some(ref mut output) = audio {
            let samples = machine.sound_frame(frame_base, frame_cycles);
            output.play_samples(samples);
        } else {
            // 出力なしでもイベントは消費する
            let _ = machine.sound_frame(frame_base, frame_cycles);
        }

        // 描画
        machine.render_frame();
        scale_buffer(&machine.video.framebuffer, &mut scaled_buffer, scale);

        // F12 でスクリーンショット
        let f12_down = window.is_key_down(Key::F12);
        if f12_down && !f12_was_down {
            let filename = format!("jr100_screenshot_{screenshot_index}.png");
            match save_screenshot(
                &filename,
                &machine.video.framebuffer,
                SCREEN_WIDTH,
                SCREEN_HEIGHT,
            ) {
                Ok(()) => {
                    println!("Saved {filename}");
                    screenshot_index += 1;
                }
                Err(e) => eprintln!("Screenshot failed: {e}"),
            }
        }
        f12_was_down = f12_down;

        let _ = window.update_with_buffer(&scaled_buffer, window_width, window_height);
    }

    // 今回の起動内容を設定へ反映
    config.last_rom = Some(args.rom.clone());
    config.last_program = args.program.clone();
    config.scale = scale;
    if let Err(e) = config.save() {
        log::warn!("Failed to save config: {e}");
    }
}
