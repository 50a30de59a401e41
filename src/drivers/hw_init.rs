//! One-shot hardware peripheral initialization.
//!
//! Configures the battery ADC channel, the shift-register output lines,
//! the button input and the buzzer LEDC timer using raw ESP-IDF sys calls.
//! Called once from `main()` before the dispatch loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    IsrInstallFailed(i32),
}

impl HwInitError {
    /// Which peripheral failed.
    pub const fn peripheral(&self) -> &'static str {
        match self {
            Self::AdcInitFailed(_) => "adc",
            Self::GpioConfigFailed(_) => "gpio",
            Self::LedcInitFailed(_) => "ledc",
            Self::IsrInstallFailed(_) => "gpio isr",
        }
    }
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc)   => write!(f, "LEDC buzzer config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e.peripheral())
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the dispatch loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
        init_button_input()?;
        init_buzzer()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// boot-time battery read.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::BATTERY_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    info!("hw_init: ADC1 configured (CH{}=battery)", pins::BATTERY_ADC_CHANNEL);
    Ok(())
}

/// Raw 12-bit reading.  A failed conversion reads as 0.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded boot path only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

/// Simulation: a full battery.
#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0x0fff
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [pins::SR_DATA_GPIO, pins::SR_CLOCK_GPIO, pins::SR_LATCH_GPIO];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: shift register lines configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_button_input() -> Result<(), HwInitError> {
    let btn_cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::BUTTON_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    let ret = unsafe { gpio_config(&btn_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an output pin configured in
    // init_gpio_outputs(). Main-loop only.
    unsafe { gpio_set_level(pin, if high { 1 } else { 0 }); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC (buzzer) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_buzzer() -> Result<(), HwInitError> {
    // SAFETY: Called from single main-task context via init_peripherals().
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: pins::BUZZER_RESOLUTION_BITS,
        freq_hz: 1_000,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }

    let ret = unsafe { ledc_channel_config(&ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: LEDC_CH_BUZZER,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        gpio_num: pins::BUZZER_GPIO,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    }) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }

    info!("hw_init: LEDC configured (buzzer=CH{})", LEDC_CH_BUZZER);
    Ok(())
}

pub const LEDC_CH_BUZZER: u32 = 0;

/// Start a square wave at `frequency_hz`; 0 silences the buzzer.
#[cfg(target_os = "espidf")]
pub fn buzzer_set(frequency_hz: u16) {
    // SAFETY: the LEDC timer/channel were configured in init_buzzer();
    // callers are the main loop and the tone-stop timer task, which never
    // overlap on the same tone.
    unsafe {
        if frequency_hz > 0 {
            ledc_set_freq(
                ledc_mode_t_LEDC_LOW_SPEED_MODE,
                ledc_timer_t_LEDC_TIMER_0,
                u32::from(frequency_hz),
            );
        }
        let duty = if frequency_hz > 0 { pins::BUZZER_DUTY_ON } else { 0 };
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, LEDC_CH_BUZZER, duty);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, LEDC_CH_BUZZER);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn buzzer_set(_frequency_hz: u16) {}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::button::button_gpio_isr;

/// Install the per-pin GPIO ISR service and register the button handler.
/// Call after init_peripherals() and before the dispatch loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed. The registered handler only touches
    // the critical-section guarded shared registers and the wake notifier.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        // Button: falling edge (active-low with pull-up already configured)
        gpio_set_intr_type(pins::BUTTON_GPIO, gpio_int_type_t_GPIO_INTR_NEGEDGE);
        let ret = gpio_isr_handler_add(pins::BUTTON_GPIO, Some(button_gpio_isr), core::ptr::null_mut());
        if ret != ESP_OK {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        gpio_intr_enable(pins::BUTTON_GPIO);

        info!("hw_init: ISR service installed (button)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
