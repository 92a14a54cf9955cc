//! Fixed bot replies shown by the client itself.

use crate::error::TransportError;

pub const WELCOME: &str = "Сайн байна уу? Би Эрүүл Мэндийн Даатгалын бот байна! Яаж туслах вэ?";

pub const CYRILLIC_ONLY: &str =
    "Би зөвхөн монгол хэлээр ойлгох тул та асуултаа кирилл үсгээр бичнэ үү.";

/// The backend answered with an empty text.
pub const FALLBACK: &str = "Уучлаарай, би энэ асуултад хариулж чадахгүй байна.";

/// The backend answered without a text field at all.
pub const NO_REPLY: &str = "❌ Алдаа: Хариу илгээсэнгүй.";

pub const SERVER_UNREACHABLE: &str = "❌ Сервер ажиллахгүй байна. Дахин оролдоно уу.";
pub const SERVER_ERROR: &str = "❌ Серверийн алдаа! Дахин оролдоно уу.";
pub const ENDPOINT_NOT_FOUND: &str = "❌ /chat эндпоинт олдсонгүй! Серверийг шалгана уу.";
pub const GENERIC_ERROR: &str = "❌ Алдаа гарлаа! Интернет холболтоо шалгана уу.";

pub const VOICE_UNAVAILABLE: &str = "❌ Уучлаарай, таны төхөөрөмж дуу таних боломжгүй байна.";
pub const VOICE_ACTIVE: &str = "Хоолойн тусламж идэвхжлээ. Яриагаа эхлүүлнэ үү...";
pub const VOICE_ERROR: &str = "❌ Хоолойн тусламжтай алдаа гарлаа. Дахин оролдоно уу.";

/// Chat text shown for a failed `/chat` call.
pub fn for_transport_error(err: &TransportError) -> String {
    match err {
        TransportError::Network(_) => SERVER_UNREACHABLE.to_string(),
        TransportError::Server(_) => SERVER_ERROR.to_string(),
        TransportError::NotFound(_) => ENDPOINT_NOT_FOUND.to_string(),
        TransportError::Other {
            message: Some(message),
            ..
        } => format!("❌ {}", message),
        TransportError::Other { message: None, .. } => GENERIC_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_error_class_has_its_own_text() {
        assert_eq!(
            for_transport_error(&TransportError::Network("refused".into())),
            SERVER_UNREACHABLE
        );
        assert_eq!(for_transport_error(&TransportError::Server(500)), SERVER_ERROR);
        assert_eq!(
            for_transport_error(&TransportError::NotFound("/chat".into())),
            ENDPOINT_NOT_FOUND
        );
        assert_eq!(
            for_transport_error(&TransportError::Other { status: Some(418), message: None }),
            GENERIC_ERROR
        );
    }

    #[test]
    fn test_server_message_is_echoed() {
        let err = TransportError::Other {
            status: Some(400),
            message: Some("Асуулт хоосон байна.".into()),
        };
        assert_eq!(for_transport_error(&err), "❌ Асуулт хоосон байна.");
    }
}
