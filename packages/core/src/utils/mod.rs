// Вспомогательные модули: текстовые кодировки и логирование

pub mod b64;
pub mod hex;
pub mod logging;
pub mod pem;
