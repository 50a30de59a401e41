//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements          | Connects to                   |
//! |-------------|---------------------|-------------------------------|
//! | `hardware`  | DisplayPort         | 74HC595 chain (GPIO bit-bang) |
//! |             | IndicatorPort       | 74HC595 chain                 |
//! |             | TonePort            | LEDC buzzer + esp_timer       |
//! |             | BatteryPort         | ESP32 ADC1                    |
//! | `log_sink`  | EventSink           | Serial log output             |
//! | `radio`     | RadioPort           | Log output (radio stand-in)   |
//! |             | PollHooks           | Identity beacon on long poll  |
//! | `device_id` | -                   | eFuse factory MAC             |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod radio;
