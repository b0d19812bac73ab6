//! JR-100 マシン統合
//!
//! CPU・メモリ・VIA・ビデオ・ブザーを結線し、
//! ステップ実行とフレーム単位の実行予算を提供する。
//! CPU がクロックマスタで、消費サイクルと同じだけ VIA が進む。

use crate::cpu::{Cpu, CpuError};
use crate::loader::{self, ProgramImage, RomError};
use crate::memory::MemorySystem;
use crate::sound::Beeper;
use crate::video::Video;

/// CPU クロック周波数 [Hz]
pub const CLOCK_HZ: f64 = 894_886.25;

/// 60fps 動作時の1フレームあたりサイクル数
pub const CYCLES_PER_FRAME: u64 = (CLOCK_HZ / 60.0) as u64;

/// マシン構成
#[derive(Debug, Clone, Copy, Default)]
pub struct MachineConfig {
    /// 拡張RAM（32KB）を搭載するか
    pub extended_ram: bool,
}

/// JR-100 本体
pub struct Machine {
    pub cpu: Cpu,
    pub mem: MemorySystem,
    pub video: Video,
    pub beeper: Beeper,
    /// 累積実行サイクル
    pub total_cycles: u64,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Self {
        Machine {
            cpu: Cpu::new(),
            mem: MemorySystem::new(CLOCK_HZ, config.extended_ram),
            video: Video::new(),
            beeper: Beeper::new(),
            total_cycles: 0,
        }
    }

    /// BASIC ROM イメージをロードする
    pub fn load_rom(&mut self, data: &[u8]) -> Result<(), RomError> {
        loader::load_rom(&mut self.mem, data)
    }

    /// パース済みプログラムをメインRAM へ適用する
    pub fn load_program(&mut self, image: &ProgramImage) {
        loader::apply_program(&mut self.mem, image);
    }

    /// 電源投入相当のリセット。RAM と周辺をクリアし、
    /// リセットベクタから CPU を再起動する（ROM は保持）
    pub fn reset(&mut self) {
        self.mem.reset();
        self.beeper.reset();
        self.cpu.reset(&mut self.mem);
        self.total_cycles = 0;
        log::info!("machine reset, pc={:04X}", self.cpu.regs.pc);
    }

    /// 1命令を実行し、消費サイクルぶん周辺を進める
    pub fn step_one(&mut self) -> Result<u32, CpuError> {
        // IRQ は VIA の複合割り込み線をフェッチ前にサンプリング
        self.cpu.irq_line = self.mem.via.irq_asserted();
        let cycles = self.cpu.step(&mut self.mem)?;
        self.mem.via.tick(cycles);
        self.total_cycles += cycles as u64;
        Ok(cycles)
    }

    /// 予算サイクルに達するまで実行し、超過分を返す。
    /// 超過分を次回の予算から引けばドリフトしない
    pub fn run_for(&mut self, budget: u64) -> Result<u64, CpuError> {
        let mut elapsed = 0u64;
        while elapsed < budget {
            elapsed += self.step_one()? as u64;
        }
        Ok(elapsed - budget)
    }

    /// 外部からの IRQ 要求（一回ぶん）
    pub fn raise_irq(&mut self) {
        self.cpu.request_irq();
    }

    /// NMI エッジの通知
    pub fn raise_nmi(&mut self) {
        self.cpu.request_nmi();
    }

    /// 外部要求による停止/再開
    pub fn set_halted(&mut self, halted: bool) {
        self.cpu.halted = halted;
    }

    /// ホストからのキー入力
    pub fn key_down(&mut self, row: usize, column: usize) {
        self.mem.via.set_key(row, column, true);
    }

    pub fn key_up(&mut self, row: usize, column: usize) {
        self.mem.via.set_key(row, column, false);
    }

    /// ダーティセルを反映したフレームバッファを返す
    pub fn render_frame(&mut self) -> &[u32] {
        self.video.render(&mut self.mem);
        &self.video.framebuffer
    }

    /// このフレームのオーディオサンプルを合成する
    pub fn sound_frame(&mut self, base_cycle: u64, cycles: u64) -> Option<&[f32]> {
        let events = self.mem.via.take_tone_events();
        self.beeper.push_events(events);
        self.beeper.generate_samples(base_cycle, cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::MemoryBus;
    use crate::memory::{ROM_BASE, ROM_LEN};
    use crate::via;

    /// リセットベクタと任意のプログラムを持つ ROM を作る
    fn rom_with_program(entry: u16, program: &[u8]) -> Vec<u8> {
        let mut rom = vec![0x01u8; ROM_LEN]; // NOP 埋め
        let offset = (entry - ROM_BASE) as usize;
        rom[offset..offset + program.len()].copy_from_slice(program);
        rom[ROM_LEN - 2] = (entry >> 8) as u8;
        rom[ROM_LEN - 1] = entry as u8;
        rom
    }

    fn machine_with_program(entry: u16, program: &[u8]) -> Machine {
        let mut machine = Machine::new(MachineConfig::default());
        machine.load_rom(&rom_with_program(entry, program)).unwrap();
        machine.reset();
        machine
    }

    #[test]
    fn reset_reads_vector_from_rom() {
        let mut rom = vec![0u8; ROM_LEN];
        rom[ROM_LEN - 2] = 0x12; // 0xFFFE
        rom[ROM_LEN - 1] = 0x34; // 0xFFFF
        let mut machine = Machine::new(MachineConfig::default());
        machine.load_rom(&rom).unwrap();
        machine.reset();

        assert_eq!(machine.cpu.regs.pc, 0x1234);
        assert_eq!(machine.cpu.regs.sp, 0x01FF);
        assert!(machine
            .cpu
            .regs
            .get_flag(crate::cpu::flags::IRQ_DISABLE));
    }

    #[test]
    fn run_for_returns_overshoot() {
        // NOP（2サイクル）だけの ROM。予算5 → 6 実行で超過1
        let mut machine = machine_with_program(0xE100, &[0x01, 0x01, 0x01, 0x01]);
        let overshoot = machine.run_for(5).unwrap();
        assert_eq!(overshoot, 1);
        assert_eq!(machine.total_cycles, 6);
    }

    #[test]
    fn via_ticks_with_cpu_cycles() {
        let mut machine = machine_with_program(0xE100, &[0x01; 16]);
        let before = machine.mem.via.clock();
        machine.run_for(10).unwrap();
        assert_eq!(machine.mem.via.clock() - before, machine.total_cycles);
    }

    #[test]
    fn via_timer1_interrupt_reaches_cpu() {
        // CLI; T1 をフリーランで起動して待つ。ハンドラは 0xE200
        let program = [
            0x0E, // CLI
            0x86, 0x40, // LDAA #$40 (ACR: T1 フリーラン)
            0xB7, 0xC8, 0x0B, // STAA $C80B
            0x86, 0xC0, // LDAA #$C0 (IER: T1 有効)
            0xB7, 0xC8, 0x0E, // STAA $C80E
            0x86, 0x08, // LDAA #$08
            0xB7, 0xC8, 0x04, // STAA $C804 (T1CL ラッチ下位)
            0x86, 0x00, // LDAA #$00
            0xB7, 0xC8, 0x05, // STAA $C805 (T1CH: カウンタ起動)
            0x20, 0xFE, // BRA *（自分自身へ）
        ];
        let mut rom = rom_with_program(0xE100, &program);
        // IRQ ベクタ → 0xE200
        rom[0x1FF8] = 0xE2;
        rom[0x1FF9] = 0x00;
        let mut machine = Machine::new(MachineConfig::default());
        machine.load_rom(&rom).unwrap();
        machine.reset();

        for _ in 0..200 {
            machine.step_one().unwrap();
            if machine.cpu.regs.pc >= 0xE200 && machine.cpu.regs.pc < 0xE300 {
                return;
            }
        }
        panic!(
            "timer interrupt never delivered, pc={:04X} ifr={:02X}",
            machine.cpu.regs.pc,
            machine.mem.via.read(via::REG_IFR)
        );
    }

    #[test]
    fn interrupt_is_not_observable_within_same_instruction() {
        // IRQ 線はフェッチ前サンプリングなので、割り込みを上げた
        // 命令自身は最後まで実行される
        let mut machine = machine_with_program(0xE100, &[0x01, 0x01]);
        machine.cpu.regs.set_flag(crate::cpu::flags::IRQ_DISABLE, false);
        machine.raise_irq();
        // 次の step で割り込みエントリ（12サイクル）に入る
        let cycles = machine.step_one().unwrap();
        assert_eq!(cycles, 12);
    }

    #[test]
    fn keyboard_scan_end_to_end() {
        // 行5を選択してポートBを読むプログラム
        let program = [
            0x86, 0x0F, // LDAA #$0F
            0xB7, 0xC8, 0x03, // STAA $C803 (DDRA: 下位4ビット出力)
            0x86, 0x05, // LDAA #$05
            0xB7, 0xC8, 0x01, // STAA $C801 (IORA: 行5選択)
            0xB6, 0xC8, 0x00, // LDAA $C800 (IORB 読み取り)
            0x97, 0x80, // STAA $80
        ];
        let mut machine = machine_with_program(0xE100, &program);
        machine.key_down(5, 4);
        for _ in 0..6 {
            machine.step_one().unwrap();
        }
        assert_eq!(machine.mem.read(0x0080), 0b1110_1111);
    }

    #[test]
    fn program_load_patches_main_ram() {
        use crate::loader::parse_prog;
        let mut file = Vec::new();
        file.extend_from_slice(b"PROG");
        file.extend_from_slice(&1u16.to_le_bytes());
        file.extend_from_slice(&2u16.to_le_bytes());
        // メモリセクション {addr=0x0100, size=1, 0xAB}
        file.extend_from_slice(&0x0100u16.to_le_bytes());
        file.extend_from_slice(&7u32.to_le_bytes());
        file.extend_from_slice(&0x0100u16.to_le_bytes());
        file.extend_from_slice(&1u16.to_le_bytes());
        file.push(0xAB);
        // BASIC フラグ
        file.extend_from_slice(&0x0002u16.to_le_bytes());
        file.extend_from_slice(&1u32.to_le_bytes());
        file.push(0x01);

        let image = parse_prog(&file).unwrap();
        let mut machine = machine_with_program(0xE100, &[0x01]);
        machine.load_program(&image);
        assert_eq!(machine.mem.read(0x0100), 0xAB);
        assert!(image.is_basic);
    }

    #[test]
    fn sound_frame_consumes_tone_events() {
        let mut machine = machine_with_program(0xE100, &[0x01; 8]);
        // ACR=0xC0（矩形波）で T1 を起動
        machine.mem.write(0xC80B, 0xC0);
        machine.mem.write(0xC804, 0xFE);
        machine.mem.write(0xC805, 0x01);
        machine.run_for(32).unwrap();
        let base = 0;
        let samples = machine.sound_frame(base, CYCLES_PER_FRAME);
        assert!(samples.is_some());
        assert!(machine.beeper.is_sounding());
    }

    #[test]
    fn nmi_edge_is_consumed_once() {
        let mut rom = rom_with_program(0xE100, &[0x01; 8]);
        rom[0x1FFC] = 0xE3; // NMI ベクタ → 0xE300
        rom[0x1FFD] = 0x00;
        let mut machine = Machine::new(MachineConfig::default());
        machine.load_rom(&rom).unwrap();
        machine.reset();

        machine.raise_nmi();
        machine.step_one().unwrap();
        assert_eq!(machine.cpu.regs.pc, 0xE300);
        // エッジは消費済みなので再発火しない
        let pc = machine.cpu.regs.pc;
        machine.step_one().unwrap();
        assert_eq!(machine.cpu.regs.pc, pc.wrapping_add(1));
    }
}
