//! Starter knowledge base for a parcel carrier.

use lib_core::{FaqCategory, FaqForCreate};

/// `(question, answer, keywords, category)`, in menu order.
const ENTRIES: &[(&str, &str, &str, FaqCategory)] = &[
    (
        "How do I create a shipment?",
        "Log in and open \"Create Shipment\". Enter the recipient, the pickup and delivery addresses, the package weight and any special instructions. A tracking number is issued as soon as the shipment is created.",
        "create, shipment, new, send, package",
        FaqCategory::Shipping,
    ),
    (
        "What are the shipping rates?",
        "Rates depend on weight, dimensions, destination and delivery speed. Use the shipping calculator for an exact quote or ask customer service.",
        "cost, price, rate, shipping, fee",
        FaqCategory::Pricing,
    ),
    (
        "What items cannot be shipped?",
        "Hazardous materials, explosives, flammable liquids, illegal substances and live animals are not accepted. The prohibited items list has the full details.",
        "prohibited, restricted, banned, cannot ship, illegal",
        FaqCategory::Shipping,
    ),
    (
        "What is the maximum weight for a package?",
        "A standard package may weigh up to 1000 kg. For anything heavier, contact the freight team.",
        "weight, maximum, limit, heavy, kg",
        FaqCategory::Shipping,
    ),
    (
        "How do I track my shipment?",
        "Enter your tracking number on the Track Shipment page to see the package location and delivery status in real time.",
        "track, tracking, where, locate, find, status",
        FaqCategory::Tracking,
    ),
    (
        "What does each tracking status mean?",
        "Pending: details received. Accepted: a courier has taken the job. Picked Up: collected from the sender. In Transit: on its way. Delivered: handed over at the destination.",
        "status, pending, accepted, transit, delivered",
        FaqCategory::Tracking,
    ),
    (
        "My tracking number is not working",
        "New tracking numbers can take up to 24 hours to appear. If it still fails after that, contact support with the number.",
        "tracking, not working, invalid, error, number",
        FaqCategory::Tracking,
    ),
    (
        "How long does delivery take?",
        "Standard delivery takes 3-5 business days and express 1-2. International shipments take 7-14 business days depending on the destination.",
        "delivery, time, how long, duration, days",
        FaqCategory::Delivery,
    ),
    (
        "Can I change the delivery address?",
        "Yes, as long as the package is not yet out for delivery. Send support your tracking number and the new address. Extra fees may apply.",
        "change, address, delivery, modify, update",
        FaqCategory::Delivery,
    ),
    (
        "What if I miss a delivery?",
        "The courier leaves a notice with instructions. You can reschedule or collect the package from the nearest facility, where it is held for 5 business days.",
        "missed, delivery, not home, absent, reschedule",
        FaqCategory::Delivery,
    ),
    (
        "Do you deliver on weekends?",
        "Express shipments can be delivered at weekends for an extra charge. Standard shipments are delivered Monday to Friday.",
        "weekend, saturday, sunday, holiday, delivery",
        FaqCategory::Delivery,
    ),
    (
        "How do I schedule a pickup?",
        "Give a pickup address and time when creating the shipment and a courier will come during that window. Support can also book a pickup for you.",
        "pickup, schedule, collect, courier, time",
        FaqCategory::Pickup,
    ),
    (
        "Is pickup service free?",
        "Pickup is free above a minimum shipment value. Smaller shipments may carry a small pickup fee; see the pricing page.",
        "pickup, free, cost, fee, charge",
        FaqCategory::Pickup,
    ),
    (
        "Can I change my pickup time?",
        "Yes, up to 2 hours before the scheduled window, through support or the self-service portal.",
        "change, pickup, time, reschedule, modify",
        FaqCategory::Pickup,
    ),
    (
        "How do I request a refund?",
        "Contact support with your tracking number and the reason for the refund. Approved refunds are processed within 7-10 business days.",
        "refund, money back, return, cancel",
        FaqCategory::Refund,
    ),
    (
        "What is your refund policy?",
        "Insured packages that are lost or damaged are refunded in full. Delays may earn a partial refund, and cancellations before pickup are refunded.",
        "refund, policy, lost, damaged, delay",
        FaqCategory::Refund,
    ),
    (
        "How long does a refund take?",
        "7-10 business days after approval, back to the original payment method. You will get an email once it is done.",
        "refund, how long, time, process, duration",
        FaqCategory::Refund,
    ),
    (
        "How do I create an account?",
        "Choose \"Register\", fill in your details and confirm your email address. After that you can create and track shipments.",
        "account, register, sign up, create, new",
        FaqCategory::Account,
    ),
    (
        "I forgot my password",
        "Use \"Forgot Password\" on the login page and follow the link we email you to set a new one.",
        "password, forgot, reset, login, access",
        FaqCategory::Account,
    ),
    (
        "How do I verify my email?",
        "Open the verification link sent to your inbox after registering. You need a verified email to log in.",
        "verify, email, verification, confirm, activation",
        FaqCategory::Account,
    ),
    (
        "Can I update my account information?",
        "Yes. Log in and open Profile Settings to change your name, email, phone number or address.",
        "update, change, profile, account, information",
        FaqCategory::Account,
    ),
    (
        "How can I contact customer support?",
        "Right here in this chat, by phone or by email. Support is available around the clock.",
        "contact, support, help, customer service, phone",
        FaqCategory::General,
    ),
    (
        "What are your business hours?",
        "Support is open 24/7. Pickups and deliveries run Monday to Friday, 9 AM to 6 PM, with weekend service for express shipments.",
        "hours, time, open, when, availability",
        FaqCategory::General,
    ),
    (
        "Do you offer insurance for shipments?",
        "Yes. Insurance covers loss, damage and theft, priced on the declared value of the package.",
        "insurance, protection, coverage, claim, valuable",
        FaqCategory::General,
    ),
    (
        "Can I ship internationally?",
        "Yes, to more than 200 countries. International shipments may need customs paperwork and follow the destination's rules.",
        "international, overseas, abroad, foreign, country",
        FaqCategory::Shipping,
    ),
];

pub fn entries() -> impl Iterator<Item = FaqForCreate> {
    ENTRIES
        .iter()
        .map(|&(question, answer, keywords, category)| FaqForCreate::new(question, answer, keywords, category))
}
