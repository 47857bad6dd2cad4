use super::sendmail::send_email;
use crate::models::paymentmodel::cents_to_rupees;
use crate::models::visitmodel::VisitStatus;

pub async fn send_welcome_email(
    to_email: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = "Welcome to RentNest";
    let body = format!(
        "<h2>Welcome, {}!</h2>\
         <p>Your RentNest account is ready. Browse listings, schedule visits and \
         manage your rentals from your dashboard.</p>",
        name
    );

    send_email(to_email, subject, &body).await
}

pub async fn send_payment_receipt_email(
    to_email: &str,
    name: &str,
    amount: i64,
    reference: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = "Payment received";
    let body = format!(
        "<h2>Hi {},</h2>\
         <p>We received your payment of <b>LKR {:.2}</b> (reference <code>{}</code>).</p>\
         <p>Your booking is confirmed and your rental agreement is now active.</p>",
        name,
        cents_to_rupees(amount),
        reference
    );

    send_email(to_email, subject, &body).await
}

pub async fn send_owner_payout_email(
    to_email: &str,
    name: &str,
    payout: i64,
    reference: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = "Rent payment received for your property";
    let body = format!(
        "<h2>Hi {},</h2>\
         <p>A payment has cleared for your property. Your payout of \
         <b>LKR {:.2}</b> (reference <code>{}</code>) is being processed.</p>",
        name,
        cents_to_rupees(payout),
        reference
    );

    send_email(to_email, subject, &body).await
}

pub async fn send_recurring_success_email(
    to_email: &str,
    name: &str,
    property_title: &str,
    amount: i64,
    reference: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = "Monthly rent charged";
    let body = format!(
        "<h2>Hi {},</h2>\
         <p>Your monthly rent of <b>LKR {:.2}</b> for <b>{}</b> was charged \
         successfully (reference <code>{}</code>).</p>",
        name,
        cents_to_rupees(amount),
        property_title,
        reference
    );

    send_email(to_email, subject, &body).await
}

pub async fn send_recurring_failure_email(
    to_email: &str,
    name: &str,
    property_title: &str,
    amount: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = "Monthly rent charge failed";
    let body = format!(
        "<h2>Hi {},</h2>\
         <p>We could not charge your monthly rent of <b>LKR {:.2}</b> for \
         <b>{}</b>. Please update your payment card or contact support to avoid \
         interruption of your lease.</p>",
        name,
        cents_to_rupees(amount),
        property_title
    );

    send_email(to_email, subject, &body).await
}

pub async fn send_visit_status_email(
    to_email: &str,
    name: &str,
    property_title: &str,
    status: &VisitStatus,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = match status {
        VisitStatus::Approved => "Your property visit is confirmed",
        VisitStatus::Rejected => "Your property visit request was declined",
        VisitStatus::Completed => "Thanks for visiting",
        VisitStatus::Cancelled => "Property visit cancelled",
        VisitStatus::Pending => "Property visit requested",
    };

    let body = format!(
        "<h2>Hi {},</h2>\
         <p>Your visit for <b>{}</b> is now <b>{}</b>.</p>",
        name,
        property_title,
        status.to_str()
    );

    send_email(to_email, subject, &body).await
}

pub async fn send_billing_summary_email(
    operator_email: &str,
    report: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let subject = "Recurring billing run summary";
    let body = format!("<pre>{}</pre>", report);

    send_email(operator_email, subject, &body).await
}
