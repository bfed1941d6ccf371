//! Keyword-matching help desk for the shop.
//!
//! Topics are checked in table order and the first topic with a keyword
//! contained in the normalized message wins. Each message is answered on its
//! own; nothing is remembered between messages.

pub const WELCOME_MESSAGE: &str =
    "안녕하세요! 🛒 쇼핑몰 고객센터입니다.\n무엇을 도와드릴까요? (도움말 입력 시 사용법 안내)";

pub const FALLBACK_RESPONSE: &str = "죄송합니다. 이해하지 못했어요. 😅

다음 키워드로 질문해 보세요:
- 배송, 반품, 결제, 영업시간, 연락처

또는 '도움말'을 입력해 주세요.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Greeting,
    Shipping,
    Returns,
    Payment,
    BusinessHours,
    Contact,
    Help,
    Thanks,
    Farewell,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Greeting => "greeting",
            Topic::Shipping => "shipping",
            Topic::Returns => "returns",
            Topic::Payment => "payment",
            Topic::BusinessHours => "business_hours",
            Topic::Contact => "contact",
            Topic::Help => "help",
            Topic::Thanks => "thanks",
            Topic::Farewell => "farewell",
        }
    }
}

#[derive(Debug)]
pub struct TopicRule {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
    pub response: &'static str,
}

/// Rules in priority order.
pub static TOPIC_RULES: [TopicRule; 9] = [
    TopicRule {
        topic: Topic::Greeting,
        keywords: &["안녕", "하이", "헬로", "hello", "hi"],
        response: "안녕하세요! 🛒 쇼핑몰 고객센터입니다. 무엇을 도와드릴까요?",
    },
    TopicRule {
        topic: Topic::Shipping,
        keywords: &["배송", "언제", "도착", "며칠"],
        response: "📦 배송 안내

- 결제 완료 후 1~2일 내 출고됩니다.
- 출고 후 1~2일 내 배송 완료됩니다.
- 제주/도서산간 지역은 2~3일 추가 소요됩니다.

배송 조회는 마이페이지에서 확인하실 수 있습니다.",
    },
    TopicRule {
        topic: Topic::Returns,
        keywords: &["반품", "교환", "환불", "취소"],
        response: "🔄 반품/교환 안내

- 수령 후 7일 이내 신청 가능합니다.
- 단순 변심: 왕복 배송비 고객 부담
- 상품 불량: 배송비 무료

반품 신청은 마이페이지 > 주문내역에서 가능합니다.",
    },
    TopicRule {
        topic: Topic::Payment,
        keywords: &["결제", "카드", "계좌", "페이", "포인트"],
        response: "💳 결제 수단 안내

- 신용/체크카드 (모든 카드 가능)
- 무통장 입금
- 카카오페이 / 네이버페이
- 포인트 결제

결제 관련 문의: 1234-5678",
    },
    TopicRule {
        topic: Topic::BusinessHours,
        keywords: &["영업", "운영", "시간", "언제까지", "몇시"],
        response: "🕐 고객센터 운영시간

- 평일: 09:00 ~ 18:00
- 점심시간: 12:00 ~ 13:00
- 주말/공휴일: 휴무

카카오톡 상담은 24시간 가능합니다.",
    },
    TopicRule {
        topic: Topic::Contact,
        keywords: &["전화", "연락", "상담", "번호", "콜센터"],
        response: "📞 고객센터 연락처

- 대표번호: 1234-5678
- 이메일: help@shop.com
- 카카오톡: @쇼핑몰

평일 09:00~18:00 운영합니다.",
    },
    TopicRule {
        topic: Topic::Help,
        keywords: &["도움", "명령", "뭐", "뭘", "기능", "할 수"],
        response: "📋 도움말

다음과 같은 질문에 답변드릴 수 있어요:

- 배송 - 배송 일정 안내
- 반품/교환 - 반품, 교환 정책
- 결제 - 결제 수단 안내
- 영업시간 - 고객센터 운영시간
- 연락처 - 고객센터 연락처

키워드를 포함해서 질문해 주세요!",
    },
    TopicRule {
        topic: Topic::Thanks,
        keywords: &["감사", "고마워", "땡큐", "thank"],
        response: "감사합니다! 다른 문의사항이 있으시면 말씀해 주세요. 😊",
    },
    TopicRule {
        topic: Topic::Farewell,
        keywords: &["종료", "끝", "바이", "bye", "안녕히"],
        response: "이용해 주셔서 감사합니다. 좋은 하루 되세요! 👋",
    },
];

impl TopicRule {
    fn matches(&self, normalized: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| normalized.contains(keyword))
    }
}

/// First matching topic, `None` when the fallback applies.
pub fn classify(message: &str) -> Option<&'static TopicRule> {
    let normalized = message.trim().to_lowercase();
    TOPIC_RULES.iter().find(|rule| rule.matches(&normalized))
}

pub fn respond(message: &str) -> &'static str {
    classify(message)
        .map(|rule| rule.response)
        .unwrap_or(FALLBACK_RESPONSE)
}
